//! Hash primitives shared by signatures and key derivation

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use sha3::Keccak256;

use crate::error::{Error, Result};

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// RIPEMD160(SHA256(data)), the BIP32 key identifier
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// Keccak-256 over the concatenation of `parts`
pub fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// BIP340 tagged hash: `SHA256(SHA256(tag) || SHA256(tag) || parts...)`
pub fn tagged_hash(tag: &str, parts: &[&[u8]]) -> [u8; 32] {
    let tag_hash = sha256(tag.as_bytes());
    let mut hasher = Sha256::new();
    hasher.update(tag_hash);
    hasher.update(tag_hash);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64]> {
    let mut hmac = <Hmac<Sha512> as KeyInit>::new_from_slice(key)
        .map_err(|e| Error::Hmac(e.to_string()))?;
    for part in parts {
        hmac.update(part);
    }
    let result = hmac.finalize().into_bytes();

    let mut out = [0u8; 64];
    out.copy_from_slice(&result);
    Ok(out)
}

pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 32]> {
    let mut hmac = <Hmac<Sha256> as KeyInit>::new_from_slice(key)
        .map_err(|e| Error::Hmac(e.to_string()))?;
    for part in parts {
        hmac.update(part);
    }
    Ok(hmac.finalize().into_bytes().into())
}
