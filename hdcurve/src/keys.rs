//! Private scalars and public keys
//!
//! Private keys are big-endian scalars in `[1, n)` exactly as wide as the
//! group order. Public keys travel as SEC1 bytes.

use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroizing;

use crate::curve::{CurveParams, CurvePoint, CurveProfile};
use crate::error::{Error, Result};

/// Parse a private key, rejecting 0 and anything `>= n` without reducing
pub(crate) fn parse_private_scalar(params: &CurveParams, bytes: &[u8]) -> Result<BigUint> {
    let width = params.scalar_field().byte_len();
    if bytes.len() != width {
        return Err(Error::length(width, bytes.len()));
    }

    let scalar = BigUint::from_bytes_be(bytes);
    if scalar.is_zero() || &scalar >= params.order() {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(scalar)
}

/// Fixed-width big-endian encoding of a scalar
pub(crate) fn scalar_to_bytes(params: &CurveParams, scalar: &BigUint) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(crate::field::to_fixed_bytes(scalar, params.scalar_field().byte_len()))
}

/// Check that `bytes` is a usable private key for `profile`
pub fn validate_private_key(profile: CurveProfile, bytes: &[u8]) -> Result<()> {
    parse_private_scalar(profile.params(), bytes).map(|_| ())
}

/// The public point `d * G`
pub fn public_key_point(profile: CurveProfile, private_key: &[u8]) -> Result<CurvePoint> {
    let params = profile.params();
    let scalar = parse_private_scalar(params, private_key)?;
    Ok(params.multiply_generator(&scalar))
}

/// Compressed SEC1 public key for a private key
pub fn public_key_from_private(profile: CurveProfile, private_key: &[u8]) -> Result<Vec<u8>> {
    let point = public_key_point(profile, private_key)?;
    Ok(profile.params().compress(&point))
}

/// Parse a compressed or uncompressed SEC1 public key; the identity is rejected
pub fn parse_public_key(profile: CurveProfile, bytes: &[u8]) -> Result<CurvePoint> {
    let point = profile.params().parse_point(bytes)?;
    if point.is_identity() {
        return Err(Error::InvalidPoint("public key is the point at infinity".to_string()));
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_bytes(value: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = value;
        bytes
    }

    #[test]
    fn test_private_key_range() {
        let profile = CurveProfile::Secp256k1;
        assert!(validate_private_key(profile, &scalar_bytes(1)).is_ok());
        assert_eq!(validate_private_key(profile, &scalar_bytes(0)), Err(Error::InvalidPrivateKey));

        let order = profile.params().order().to_bytes_be();
        assert_eq!(validate_private_key(profile, &order), Err(Error::InvalidPrivateKey));
        assert_eq!(validate_private_key(profile, &[0xff; 32]), Err(Error::InvalidPrivateKey));
        assert_eq!(
            validate_private_key(profile, &[1u8; 31]),
            Err(Error::InvalidInputLength { expected: 32, actual: 31 })
        );
    }

    #[test]
    fn test_public_key_of_one_is_generator() {
        for profile in CurveProfile::ALL {
            let params = profile.params();
            let public = public_key_from_private(profile, &scalar_bytes(1)).unwrap();
            assert_eq!(public, params.compress(params.generator()));
            assert_eq!(&parse_public_key(profile, &public).unwrap(), params.generator());
        }
    }

    #[test]
    fn test_parse_public_key_rejects_identity() {
        assert!(matches!(
            parse_public_key(CurveProfile::Secp256k1, &[0x00]),
            Err(Error::InvalidPoint(_))
        ));
    }
}
