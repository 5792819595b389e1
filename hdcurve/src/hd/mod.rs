//! Hierarchical deterministic key trees (BIP32)
//!
//! A seed becomes a master [`ExtendedKey`]; children are derived on demand and
//! every node is an independent immutable value.

mod extended;
mod path;

pub use extended::{
    ExtendedKey, ENCODED_LEN, VERSION_MAINNET_PRIVATE, VERSION_MAINNET_PUBLIC, VERSION_TESTNET_PRIVATE,
    VERSION_TESTNET_PUBLIC,
};
pub use path::{ChildIndex, DerivationPath, HARDENED_OFFSET};

use crate::curve::CurveProfile;
use crate::error::Result;

/// Derive the key at `path` from a seed
pub fn derive_key(profile: CurveProfile, seed: &[u8], path: &str) -> Result<ExtendedKey> {
    let path: DerivationPath = path.parse()?;
    ExtendedKey::master_from_seed(profile, seed)?.derive_path(&path)
}
