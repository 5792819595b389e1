//! BIP32 extended keys

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::path::{ChildIndex, DerivationPath};
use crate::curve::{CurvePoint, CurveProfile};
use crate::error::{Error, Result};
use crate::hash::{hash160, hmac_sha512};
use crate::keys::{parse_private_scalar, parse_public_key, scalar_to_bytes};

// Version bytes for serialization
pub const VERSION_MAINNET_PRIVATE: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
pub const VERSION_MAINNET_PUBLIC: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
pub const VERSION_TESTNET_PRIVATE: [u8; 4] = [0x04, 0x35, 0x83, 0x94];
pub const VERSION_TESTNET_PUBLIC: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];

/// Serialized size: version (4) | depth (1) | parent fingerprint (4) |
/// child index (4) | chain code (32) | key data (33)
pub const ENCODED_LEN: usize = 78;

const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// A node of the key tree
///
/// Keys are immutable: derivation returns new values and never touches the parent.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    profile: CurveProfile,
    private_key: Option<Zeroizing<Vec<u8>>>,
    public_key: CurvePoint,
    chain_code: [u8; 32],
    depth: u8,
    child_index: ChildIndex,
    parent_fingerprint: [u8; 4],
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("profile", &self.profile)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .field("chain_code", &hex::encode(self.chain_code))
            .field("depth", &self.depth)
            .field("child_index", &self.child_index)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .finish()
    }
}

/// Split HMAC-SHA512 output into `(IL, IR)`
fn split_output(output: &[u8; 64]) -> (BigUint, [u8; 32]) {
    let il = BigUint::from_bytes_be(&output[..32]);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&output[32..]);
    (il, chain_code)
}

impl ExtendedKey {
    /// Master key from a seed (16 to 64 bytes)
    pub fn master_from_seed(profile: CurveProfile, seed: &[u8]) -> Result<Self> {
        if seed.len() < MIN_SEED_LEN {
            return Err(Error::length(MIN_SEED_LEN, seed.len()));
        }
        if seed.len() > MAX_SEED_LEN {
            return Err(Error::length(MAX_SEED_LEN, seed.len()));
        }

        let params = profile.params();
        let output = Zeroizing::new(hmac_sha512(profile.hd_seed_key(), &[seed])?);
        let (il, chain_code) = split_output(&output);
        if il.is_zero() || &il >= params.order() {
            return Err(Error::InvalidSeed);
        }

        let key = Self {
            profile,
            private_key: Some(scalar_to_bytes(params, &il)),
            public_key: params.multiply_generator(&il),
            chain_code,
            depth: 0,
            child_index: ChildIndex::from(0),
            parent_fingerprint: [0u8; 4],
        };
        debug!(curve = %profile, fingerprint = %hex::encode(key.fingerprint()), "created master key");
        Ok(key)
    }

    /// Derive one child at an explicit index
    ///
    /// Fails with `InvalidChildKey` when `IL >= n` or the child key is zero;
    /// use [`ExtendedKey::derive_next_valid_child`] to skip such indices.
    pub fn derive_child(&self, index: impl Into<ChildIndex>) -> Result<Self> {
        let index = index.into();
        let params = self.profile.params();
        let depth = self
            .depth
            .checked_add(1)
            .ok_or_else(|| Error::InvalidExtendedKey("maximum depth of 255 exceeded".to_string()))?;

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if index.is_hardened() {
            let private_key = self
                .private_key
                .as_ref()
                .ok_or(Error::PublicDerivationUnavailable(index.raw()))?;
            data.push(0);
            data.extend_from_slice(private_key);
        } else {
            data.extend_from_slice(&self.public_key_bytes());
        }
        data.extend_from_slice(&index.raw().to_be_bytes());

        let output = Zeroizing::new(hmac_sha512(&self.chain_code, &[&data])?);
        let (il, chain_code) = split_output(&output);
        if &il >= params.order() {
            return Err(Error::InvalidChildKey(index.raw()));
        }

        let (private_key, public_key) = match &self.private_key {
            Some(parent) => {
                let scalars = params.scalar_field();
                let child = scalars
                    .add(&scalars.element(il), &scalars.element(BigUint::from_bytes_be(parent)))
                    .into_value();
                if child.is_zero() {
                    return Err(Error::InvalidChildKey(index.raw()));
                }
                let public_key = params.multiply_generator(&child);
                (Some(scalar_to_bytes(params, &child)), public_key)
            }
            None => {
                let public_key = params.add(&params.multiply_generator(&il), &self.public_key);
                if public_key.is_identity() {
                    return Err(Error::InvalidChildKey(index.raw()));
                }
                (None, public_key)
            }
        };

        let child = Self {
            profile: self.profile,
            private_key,
            public_key,
            chain_code,
            depth,
            child_index: index,
            parent_fingerprint: self.fingerprint(),
        };
        debug!(depth, index = %index, neutered = child.is_neutered(), "derived child key");
        Ok(child)
    }

    /// Derive the first valid child at or after `start`, staying in the
    /// hardened or normal range of `start`
    pub fn derive_next_valid_child(&self, start: impl Into<ChildIndex>) -> Result<Self> {
        let mut index = start.into();
        loop {
            match self.derive_child(index) {
                Err(Error::InvalidChildKey(_)) => {
                    warn!(index = %index, "invalid child key, skipping to the next index");
                    index = index
                        .next()
                        .ok_or_else(|| Error::InvalidPath("child index range exhausted".to_string()))?;
                }
                result => return result,
            }
        }
    }

    /// Apply every index of `path` in turn; no partial result on failure
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        path.iter().try_fold(self.clone(), |key, index| key.derive_child(index))
    }

    pub fn derive_path_str(&self, path: &str) -> Result<Self> {
        self.derive_path(&path.parse()?)
    }

    /// The same node without its private key
    pub fn neuter(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    pub fn is_neutered(&self) -> bool {
        self.private_key.is_none()
    }

    pub fn profile(&self) -> CurveProfile {
        self.profile
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_index(&self) -> ChildIndex {
        self.child_index
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn public_key(&self) -> &CurvePoint {
        &self.public_key
    }

    /// Compressed SEC1 public key
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.profile.params().compress(&self.public_key)
    }

    pub fn public_key_uncompressed(&self) -> Vec<u8> {
        self.profile.params().serialize_uncompressed(&self.public_key)
    }

    /// Raw private scalar, absent on neutered keys
    pub fn private_key_bytes(&self) -> Option<&[u8]> {
        self.private_key.as_ref().map(|key| key.as_slice())
    }

    /// HASH160 of the compressed public key
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key_bytes())
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&self.identifier()[..4]);
        fingerprint
    }

    /// 78-byte serialization; private key data is used when present
    pub fn encode(&self, version: [u8; 4]) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(ENCODED_LEN));
        out.extend_from_slice(&version);
        out.push(self.depth);
        out.extend_from_slice(&self.parent_fingerprint);
        out.extend_from_slice(&self.child_index.raw().to_be_bytes());
        out.extend_from_slice(&self.chain_code);
        match &self.private_key {
            Some(private_key) => {
                out.push(0);
                out.extend_from_slice(private_key);
            }
            None => out.extend_from_slice(&self.public_key_bytes()),
        }
        out
    }

    /// Parse the 78-byte serialization
    pub fn decode(profile: CurveProfile, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENCODED_LEN {
            return Err(Error::length(ENCODED_LEN, bytes.len()));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[0..4]);
        let is_private = match version {
            VERSION_MAINNET_PRIVATE | VERSION_TESTNET_PRIVATE => true,
            VERSION_MAINNET_PUBLIC | VERSION_TESTNET_PUBLIC => false,
            _ => return Err(Error::InvalidExtendedKey(format!("unknown version {}", hex::encode(version)))),
        };

        let depth = bytes[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&bytes[5..9]);
        let mut raw_index = [0u8; 4];
        raw_index.copy_from_slice(&bytes[9..13]);
        let child_index = ChildIndex::from(u32::from_be_bytes(raw_index));
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[13..45]);
        let key_data = &bytes[45..78];

        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_index.raw() != 0) {
            return Err(Error::InvalidExtendedKey(
                "master key with non-zero parent fingerprint or child index".to_string(),
            ));
        }

        let params = profile.params();
        let (private_key, public_key) = if is_private {
            if key_data[0] != 0 {
                return Err(Error::InvalidExtendedKey("private key data must start with 0x00".to_string()));
            }
            let scalar = parse_private_scalar(params, &key_data[1..])?;
            (Some(scalar_to_bytes(params, &scalar)), params.multiply_generator(&scalar))
        } else {
            (None, parse_public_key(profile, key_data)?)
        };

        Ok(Self {
            profile,
            private_key,
            public_key,
            chain_code,
            depth,
            child_index,
            parent_fingerprint,
        })
    }
}
