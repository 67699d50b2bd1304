//! URL-safe base64 with optional padding.
//!
//! Senders routinely drop the trailing `=` padding, so decoding restores it
//! to the next multiple of four before decoding. Unused bits in the final
//! symbol are ignored: only characters outside the alphabet are rejected.

use crate::error::TokenError;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::{Engine, alphabet};

/// URL-safe decoder that tolerates non-zero trailing bits.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode URL-safe base64 text, padded or not.
pub fn decode(text: &str) -> Result<Vec<u8>, TokenError> {
    let missing = text.len() % 4;
    if missing == 0 {
        return Ok(LENIENT_URL_SAFE.decode(text)?);
    }

    let mut padded = String::with_capacity(text.len() + 4 - missing);
    padded.push_str(text);
    padded.extend(std::iter::repeat_n('=', 4 - missing));
    Ok(LENIENT_URL_SAFE.decode(padded)?)
}

/// Encode bytes as unpadded URL-safe base64.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}
