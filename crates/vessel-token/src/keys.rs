//! P-256 public keys: the attestation trust anchor and the self-declared
//! keys embedded in session tokens.

use crate::codec;
use crate::error::KeyError;
use jsonwebtoken::DecodingKey;
use p256::ecdsa::VerifyingKey;
use p256::{EncodedPoint, FieldBytes};
use std::fmt;
use vessel_core::TrustAnchorConfig;
use vessel_core::config::trust_anchor::{DEFAULT_ANCHOR_X, DEFAULT_ANCHOR_Y};

/// Interpret big-endian unsigned bytes as a P-256 field element.
///
/// Leading zero bytes are ignored and short input is left-padded, so a
/// coordinate that lost its leading zeros in transit still maps to the same
/// value. Returns `None` if the value needs more than 32 bytes.
pub(crate) fn field_bytes(raw: &[u8]) -> Option<FieldBytes> {
    let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    let significant = &raw[first..];
    if significant.len() > 32 {
        return None;
    }
    let mut out = FieldBytes::default();
    out[32 - significant.len()..].copy_from_slice(significant);
    Some(out)
}

/// Build a verifying key from affine coordinates, rejecting off-curve points.
pub(crate) fn verifying_key(x: &FieldBytes, y: &FieldBytes) -> Result<VerifyingKey, p256::ecdsa::Error> {
    let point = EncodedPoint::from_affine_coordinates(x, y, false);
    VerifyingKey::from_encoded_point(&point)
}

/// The fixed public key that signs attestation tokens.
///
/// Built once at startup and then only read; clone it freely into verifiers.
#[derive(Clone)]
pub struct TrustAnchor {
    verifying_key: VerifyingKey,
    decoding_key: DecodingKey,
}

impl TrustAnchor {
    /// The attestation authority's published key.
    pub fn published() -> Result<Self, KeyError> {
        Self::from_hex(DEFAULT_ANCHOR_X, DEFAULT_ANCHOR_Y)
    }

    /// Load the anchor described by configuration.
    pub fn from_config(config: &TrustAnchorConfig) -> Result<Self, KeyError> {
        let coords = config.resolve_coordinates()?;
        Self::from_hex(&coords.x, &coords.y)
    }

    /// Load from hex-encoded affine coordinates.
    pub fn from_hex(x_hex: &str, y_hex: &str) -> Result<Self, KeyError> {
        let x = coordinate_from_hex("x", x_hex)?;
        let y = coordinate_from_hex("y", y_hex)?;
        let key = verifying_key(&x, &y).map_err(|e| KeyError::InvalidPoint(e.to_string()))?;
        Self::from_verifying_key(key)
    }

    /// Wrap an existing verifying key.
    pub fn from_verifying_key(verifying_key: VerifyingKey) -> Result<Self, KeyError> {
        let point = verifying_key.to_encoded_point(false);
        let (Some(x), Some(y)) = (point.x(), point.y()) else {
            return Err(KeyError::InvalidPoint("point has no affine coordinates".to_string()));
        };
        let decoding_key = DecodingKey::from_ec_components(&codec::encode(x), &codec::encode(y))
            .map_err(|e| KeyError::InvalidPoint(e.to_string()))?;

        Ok(Self {
            verifying_key,
            decoding_key,
        })
    }

    /// The anchor as a P-256 verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Uncompressed SEC1 encoding (`04 || x || y`) as hex.
    pub fn to_sec1_hex(&self) -> String {
        hex::encode(self.verifying_key.to_encoded_point(false).as_bytes())
    }
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchor")
            .field("point", &self.to_sec1_hex())
            .finish()
    }
}

fn coordinate_from_hex(coordinate: &'static str, text: &str) -> Result<FieldBytes, KeyError> {
    let text = text.trim();
    let bytes = if text.len() % 2 == 1 {
        hex::decode(format!("0{text}"))
    } else {
        hex::decode(text)
    }
    .map_err(|source| KeyError::InvalidHex { coordinate, source })?;

    field_bytes(&bytes).ok_or(KeyError::InvalidCoordinate {
        coordinate,
        len: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use rand_core::OsRng;

    #[test]
    fn test_published_anchor_loads() {
        let anchor = TrustAnchor::published().unwrap();
        let hex = anchor.to_sec1_hex();
        assert_eq!(hex.len(), 130);
        assert_eq!(hex, format!("04{DEFAULT_ANCHOR_X}{DEFAULT_ANCHOR_Y}"));
    }

    #[test]
    fn test_from_config_defaults() {
        let anchor = TrustAnchor::from_config(&TrustAnchorConfig::default()).unwrap();
        assert_eq!(
            anchor.verifying_key(),
            TrustAnchor::published().unwrap().verifying_key()
        );
    }

    #[test]
    fn test_hex_roundtrip_for_generated_key() {
        let signing = SigningKey::random(&mut OsRng);
        let point = signing.verifying_key().to_encoded_point(false);
        let x = hex::encode(point.x().unwrap());
        let y = hex::encode(point.y().unwrap());

        let anchor = TrustAnchor::from_hex(&x, &y).unwrap();
        assert_eq!(anchor.verifying_key(), signing.verifying_key());
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let res = TrustAnchor::from_hex(DEFAULT_ANCHOR_X, DEFAULT_ANCHOR_X);
        assert!(matches!(res, Err(KeyError::InvalidPoint(_))));
    }

    #[test]
    fn test_bad_hex_rejected() {
        let res = TrustAnchor::from_hex("zz", DEFAULT_ANCHOR_Y);
        assert!(matches!(
            res,
            Err(KeyError::InvalidHex { coordinate: "x", .. })
        ));
    }

    #[test]
    fn test_oversized_coordinate_rejected() {
        let long = format!("01{DEFAULT_ANCHOR_X}");
        let res = TrustAnchor::from_hex(&long, DEFAULT_ANCHOR_Y);
        assert!(matches!(
            res,
            Err(KeyError::InvalidCoordinate { coordinate: "x", len: 33 })
        ));
    }

    #[test]
    fn test_field_bytes_padding() {
        let fb = field_bytes(&[0, 0, 1, 2]).unwrap();
        assert_eq!(fb[30], 1);
        assert_eq!(fb[31], 2);
        assert!(fb[..30].iter().all(|b| *b == 0));

        let mut wide = vec![0u8; 40];
        wide[39] = 9;
        assert!(field_bytes(&wide).is_some());
        assert!(field_bytes(&[1u8; 33]).is_none());
    }
}
