//! Generalized Schnorr signatures
//!
//! The signing algorithm is BIP340's: x-only public keys, even-y nonce points,
//! and auxiliary randomness masked into the nonce seed. The three hashes it
//! uses (`aux`, `nonce`, `challenge`) come from a pluggable [`ChallengeHash`],
//! so chains that hash with Keccak-256 reuse the same flow.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::curve::{CurveParams, CurvePoint, CurveProfile};
use crate::error::{Error, Result};
use crate::field::to_fixed_bytes;
use crate::hash::{keccak256, tagged_hash};
use crate::keys::parse_private_scalar;

/// Hash family behind the nonce and challenge computations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeHash {
    /// SHA-256 tagged hashes `BIP0340/<domain>`
    #[default]
    Bip340,
    /// Keccak-256 prefixed with `Keccak256/<domain>`
    ///
    /// The prefix scheme is specific to this crate and is not the challenge
    /// hash of any deployed chain; signatures will not interoperate with one.
    Keccak256,
}

impl ChallengeHash {
    /// Domain-separated hash of the concatenated `parts`
    pub fn digest(self, domain: &str, parts: &[&[u8]]) -> [u8; 32] {
        match self {
            ChallengeHash::Bip340 => tagged_hash(&format!("BIP0340/{domain}"), parts),
            ChallengeHash::Keccak256 => {
                let prefix = format!("Keccak256/{domain}");
                let mut all: Vec<&[u8]> = Vec::with_capacity(parts.len() + 1);
                all.push(prefix.as_bytes());
                all.extend_from_slice(parts);
                keccak256(&all)
            }
        }
    }
}

/// A Schnorr signature `R.x || s`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchnorrSignature {
    bytes: Vec<u8>,
}

impl SchnorrSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// x-coordinate of the nonce point
    pub fn r_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() / 2]
    }

    pub fn s_bytes(&self) -> &[u8] {
        &self.bytes[self.bytes.len() / 2..]
    }
}

/// Schnorr over a curve profile with a chosen challenge hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schnorr {
    profile: CurveProfile,
    hash: ChallengeHash,
}

impl Schnorr {
    pub fn new(profile: CurveProfile, hash: ChallengeHash) -> Self {
        Self { profile, hash }
    }

    /// BIP340 over secp256k1
    pub fn bip340() -> Self {
        Self::new(CurveProfile::Secp256k1, ChallengeHash::Bip340)
    }

    pub fn profile(&self) -> CurveProfile {
        self.profile
    }

    pub fn challenge_hash(&self) -> ChallengeHash {
        self.hash
    }

    fn params(&self) -> &'static CurveParams {
        self.profile.params()
    }

    fn scalar_width(&self) -> usize {
        self.params().scalar_field().byte_len()
    }

    fn x_width(&self) -> usize {
        self.params().field().byte_len()
    }

    /// Hash output reduced into the scalar field
    fn hash_scalar(&self, domain: &str, parts: &[&[u8]]) -> BigUint {
        BigUint::from_bytes_be(&self.hash.digest(domain, parts)) % self.params().order()
    }

    /// x-only public key for a private key
    pub fn x_only_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>> {
        let params = self.params();
        let d = parse_private_scalar(params, private_key)?;
        match params.multiply_generator(&d) {
            CurvePoint::Affine(point) => Ok(params.field().to_bytes(point.x())),
            CurvePoint::Identity => Err(Error::PointAtInfinity),
        }
    }

    /// Sign `message` with the auxiliary randomness `aux_rand`
    pub fn sign(&self, message: &[u8], private_key: &[u8], aux_rand: &[u8]) -> Result<SchnorrSignature> {
        let params = self.params();
        let field = params.field();
        let scalars = params.scalar_field();
        let n = params.order();
        let width = self.scalar_width();
        if aux_rand.len() != 32 {
            return Err(Error::length(32, aux_rand.len()));
        }

        let d0 = parse_private_scalar(params, private_key)?;
        let public = params.multiply_generator(&d0);
        let px = match &public {
            CurvePoint::Affine(point) => field.to_bytes(point.x()),
            CurvePoint::Identity => return Err(Error::PointAtInfinity),
        };
        let d = if public.has_even_y() { d0 } else { n - d0 };

        let mask = self.hash.digest("aux", &[aux_rand]);
        let mut t = Zeroizing::new(to_fixed_bytes(&d, width));
        for (byte, m) in t.iter_mut().zip(mask.iter()) {
            *byte ^= m;
        }

        let k0 = self.hash_scalar("nonce", &[&t, &px, message]);
        if k0.is_zero() {
            return Err(Error::ZeroNonce);
        }
        let nonce_point = params.multiply_generator(&k0);
        let rx = match &nonce_point {
            CurvePoint::Affine(point) => field.to_bytes(point.x()),
            CurvePoint::Identity => return Err(Error::ZeroNonce),
        };
        let k = if nonce_point.has_even_y() { k0 } else { n - k0 };

        let e = self.hash_scalar("challenge", &[&rx, &px, message]);
        let ed = scalars.mul(&scalars.element(e), &scalars.element(d));
        let s = scalars.add(&scalars.element(k), &ed);

        let mut bytes = rx;
        bytes.extend_from_slice(&scalars.to_bytes(&s));
        let signature = SchnorrSignature { bytes };

        if !self.verify(message, &px, &signature)? {
            return Err(Error::InvalidSignature("produced signature failed verification".to_string()));
        }
        Ok(signature)
    }

    /// Sign with fresh auxiliary randomness from the OS generator
    pub fn sign_with_rng(&self, message: &[u8], private_key: &[u8]) -> Result<SchnorrSignature> {
        let mut aux = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(&mut *aux);
        self.sign(message, private_key, &*aux)
    }

    /// Verify against an x-only public key
    ///
    /// A public key whose x has no curve point is an ingress error
    /// (`InvalidPoint`); a well-formed but wrong signature returns `false`.
    pub fn verify(&self, message: &[u8], public_key: &[u8], signature: &SchnorrSignature) -> Result<bool> {
        let params = self.params();
        let field = params.field();
        let n = params.order();
        let x_width = self.x_width();
        if public_key.len() != x_width {
            return Err(Error::length(x_width, public_key.len()));
        }
        let expected = x_width + self.scalar_width();
        if signature.bytes.len() != expected {
            return Err(Error::length(expected, signature.bytes.len()));
        }

        let px = field
            .from_canonical_bytes(public_key)
            .ok_or_else(|| Error::InvalidPoint("x-only public key out of range".to_string()))?;
        let public = params.lift_x(&px, false)?;

        let (r_bytes, s_bytes) = signature.bytes.split_at(x_width);
        let r = match field.from_canonical_bytes(r_bytes) {
            Some(r) => r,
            None => return Ok(false),
        };
        let s = BigUint::from_bytes_be(s_bytes);
        if &s >= n {
            return Ok(false);
        }

        let e = self.hash_scalar("challenge", &[r_bytes, public_key, message]);
        // R = s*G - e*P
        let minus_e = params.scalar_field().neg(&params.scalar_field().element(e));
        match params.multiply_add(&s, minus_e.value(), &public) {
            CurvePoint::Identity => Ok(false),
            point @ CurvePoint::Affine(_) => Ok(point.has_even_y() && point.x() == Some(&r)),
        }
    }

    /// Accept a raw `R.x || s` encoding after a length check
    pub fn parse_signature(&self, bytes: &[u8]) -> Result<SchnorrSignature> {
        let expected = self.x_width() + self.scalar_width();
        if bytes.len() != expected {
            return Err(Error::length(expected, bytes.len()));
        }
        Ok(SchnorrSignature { bytes: bytes.to_vec() })
    }
}
