//! ECDSA with public-key recovery

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use super::rfc6979::{bits2int, NonceGenerator};
use crate::curve::{CurveParams, CurvePoint, CurveProfile};
use crate::error::{Error, Result};
use crate::field::to_fixed_bytes;
use crate::keys::parse_private_scalar;

/// Signing knobs, deserializable from adapter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignOptions {
    /// Derive the nonce from key and digest only. When false, 32 bytes from
    /// the OS generator are mixed into the nonce derivation.
    pub deterministic_nonce: bool,
    /// Normalize `s` to `min(s, n - s)`
    pub low_s: bool,
    /// Extra data for the nonce derivation (RFC 6979 §3.6)
    pub extra_entropy: Option<[u8; 32]>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            deterministic_nonce: true,
            low_s: true,
            extra_entropy: None,
        }
    }
}

/// An ECDSA signature `(r, s)` with an optional recovery id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignature {
    r: BigUint,
    s: BigUint,
    recovery_id: Option<u8>,
}

impl EcdsaSignature {
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Bit 0: parity of `R.y`; bit 1: `R.x` was at least `n`
    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }
}

/// ECDSA over one of the built-in curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ecdsa {
    profile: CurveProfile,
}

impl Ecdsa {
    pub fn new(profile: CurveProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> CurveProfile {
        self.profile
    }

    fn params(&self) -> &'static CurveParams {
        self.profile.params()
    }

    fn digest_to_scalar(&self, digest: &[u8]) -> Result<BigUint> {
        let params = self.params();
        let width = params.scalar_field().byte_len();
        if digest.len() != width {
            return Err(Error::length(width, digest.len()));
        }
        Ok(bits2int(digest, params.order()))
    }

    /// Deterministic low-S signature with a recovery id
    pub fn sign(&self, digest: &[u8], private_key: &[u8]) -> Result<EcdsaSignature> {
        self.sign_with_options(digest, private_key, &SignOptions::default())
    }

    pub fn sign_with_options(&self, digest: &[u8], private_key: &[u8], options: &SignOptions) -> Result<EcdsaSignature> {
        let params = self.params();
        let d = parse_private_scalar(params, private_key)?;
        let e = self.digest_to_scalar(digest)?;

        let mut extra = Zeroizing::new(Vec::new());
        if let Some(entropy) = &options.extra_entropy {
            extra.extend_from_slice(entropy);
        }
        if !options.deterministic_nonce {
            let mut random = Zeroizing::new([0u8; 32]);
            OsRng.fill_bytes(&mut *random);
            extra.extend_from_slice(&*random);
        }
        let extra = if extra.is_empty() { None } else { Some(extra.as_slice()) };

        let mut nonces = NonceGenerator::new(params.order(), &d, digest, extra)?;
        loop {
            let k = nonces.next_nonce()?;
            match self.try_sign(&e, &d, &k, options.low_s) {
                Err(err @ (Error::ZeroR | Error::ZeroS)) => {
                    warn!(curve = %self.profile, error = %err, "rejected nonce candidate, retrying");
                }
                result => return result,
            }
        }
    }

    /// One signing attempt with a fixed nonce
    fn try_sign(&self, e: &BigUint, d: &BigUint, k: &BigUint, low_s: bool) -> Result<EcdsaSignature> {
        let params = self.params();
        let n = params.order();
        let scalars = params.scalar_field();

        let point = params.multiply_generator(k);
        let (x, y) = match &point {
            CurvePoint::Affine(point) => (point.x().value(), point.y()),
            CurvePoint::Identity => return Err(Error::ZeroR),
        };

        let r = x % n;
        if r.is_zero() {
            return Err(Error::ZeroR);
        }
        let mut recovery_id = u8::from(!y.is_even()) | (u8::from(x >= n) << 1);

        let k_inv = scalars.invert(&scalars.element(k.clone()))?;
        let rd = scalars.mul(&scalars.element(r.clone()), &scalars.element(d.clone()));
        let sum = scalars.add(&scalars.element(e.clone()), &rd);
        let mut s = scalars.mul(&k_inv, &sum).into_value();
        if s.is_zero() {
            return Err(Error::ZeroS);
        }

        if low_s && s > (n >> 1u32) {
            s = n - &s;
            recovery_id ^= 1;
        }

        Ok(EcdsaSignature {
            r,
            s,
            recovery_id: Some(recovery_id),
        })
    }

    /// Check a signature; out-of-range `r` or `s` verifies as false
    pub fn verify(&self, digest: &[u8], public_key: &CurvePoint, signature: &EcdsaSignature) -> Result<bool> {
        let params = self.params();
        let n = params.order();
        let e = self.digest_to_scalar(digest)?;

        if !params.is_on_curve(public_key) {
            return Err(Error::InvalidPoint("public key is not on the curve".to_string()));
        }
        if public_key.is_identity() {
            return Ok(false);
        }

        let (r, s) = (&signature.r, &signature.s);
        if r.is_zero() || s.is_zero() || r >= n || s >= n {
            return Ok(false);
        }

        let scalars = params.scalar_field();
        let s_inv = scalars.invert(&scalars.element(s.clone()))?;
        let u1 = scalars.mul(&scalars.element(e), &s_inv);
        let u2 = scalars.mul(&scalars.element(r.clone()), &s_inv);

        match params.multiply_add(u1.value(), u2.value(), public_key) {
            CurvePoint::Identity => Ok(false),
            CurvePoint::Affine(point) => Ok(&(point.x().value() % n) == r),
        }
    }

    /// Reconstruct the signer's public key
    pub fn recover(&self, digest: &[u8], r: &BigUint, s: &BigUint, recovery_id: u8) -> Result<CurvePoint> {
        if recovery_id > 3 {
            return Err(Error::InvalidRecoveryId(recovery_id));
        }

        let params = self.params();
        let n = params.order();
        let e = self.digest_to_scalar(digest)?;
        if r.is_zero() || s.is_zero() || r >= n || s >= n {
            return Err(Error::InvalidSignature("r or s out of range".to_string()));
        }

        let mut x = r.clone();
        if recovery_id & 2 != 0 {
            x += n;
        }
        let field = params.field();
        let x = field
            .from_canonical(x)
            .ok_or(Error::InvalidRecoveryId(recovery_id))?;
        let big_r = params.lift_x(&x, recovery_id & 1 == 1)?;

        // Q = r^-1 (s R - e G)
        let scalars = params.scalar_field();
        let r_inv = scalars.invert(&scalars.element(r.clone()))?;
        let u1 = scalars.neg(&scalars.mul(&scalars.element(e), &r_inv));
        let u2 = scalars.mul(&scalars.element(s.clone()), &r_inv);

        let public_key = params.multiply_add(u1.value(), u2.value(), &big_r);
        if public_key.is_identity() {
            return Err(Error::PointAtInfinity);
        }
        Ok(public_key)
    }

    /// Recover using the id carried by the signature
    pub fn recover_signature(&self, digest: &[u8], signature: &EcdsaSignature) -> Result<CurvePoint> {
        let recovery_id = signature
            .recovery_id
            .ok_or_else(|| Error::InvalidSignature("signature has no recovery id".to_string()))?;
        self.recover(digest, &signature.r, &signature.s, recovery_id)
    }

    /// `r || s`
    pub fn serialize_compact(&self, signature: &EcdsaSignature) -> Vec<u8> {
        let width = self.params().scalar_field().byte_len();
        let mut out = to_fixed_bytes(&signature.r, width);
        out.extend_from_slice(&to_fixed_bytes(&signature.s, width));
        out
    }

    /// `r || s || v`; fails if the signature carries no recovery id
    pub fn serialize_recoverable(&self, signature: &EcdsaSignature) -> Result<Vec<u8>> {
        let recovery_id = signature
            .recovery_id
            .ok_or_else(|| Error::InvalidSignature("signature has no recovery id".to_string()))?;
        let mut out = self.serialize_compact(signature);
        out.push(recovery_id);
        Ok(out)
    }

    pub fn parse_compact(&self, bytes: &[u8]) -> Result<EcdsaSignature> {
        let params = self.params();
        let width = params.scalar_field().byte_len();
        if bytes.len() != 2 * width {
            return Err(Error::length(2 * width, bytes.len()));
        }

        let n = params.order();
        let r = BigUint::from_bytes_be(&bytes[..width]);
        let s = BigUint::from_bytes_be(&bytes[width..]);
        if r.is_zero() || s.is_zero() || &r >= n || &s >= n {
            return Err(Error::InvalidSignature("r or s out of range".to_string()));
        }
        Ok(EcdsaSignature { r, s, recovery_id: None })
    }

    pub fn parse_recoverable(&self, bytes: &[u8]) -> Result<EcdsaSignature> {
        let width = self.params().scalar_field().byte_len();
        if bytes.len() != 2 * width + 1 {
            return Err(Error::length(2 * width + 1, bytes.len()));
        }
        let recovery_id = bytes[2 * width];
        if recovery_id > 3 {
            return Err(Error::InvalidRecoveryId(recovery_id));
        }

        let mut signature = self.parse_compact(&bytes[..2 * width])?;
        signature.recovery_id = Some(recovery_id);
        Ok(signature)
    }
}
