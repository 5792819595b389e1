//! hdcurve - HD keys and signatures over short-Weierstrass curves
//!
//! This library provides the cryptographic core beneath chain-specific wallet
//! adapters: prime-field arithmetic, curve group operations, ECDSA with public
//! key recovery, generalized Schnorr signatures and BIP32 key derivation.
//! Adapters supply seeds, digests and the curve profile; framing such as
//! base58 or bech32 stays on their side.

pub mod error;
pub mod field;
pub mod curve;
pub mod hash;
pub mod keys;
pub mod signature;
pub mod hd;

// Re-export commonly used types for convenience
pub use curve::{AffinePoint, CurveParams, CurvePoint, CurveProfile};
pub use error::{Error, Result};
pub use field::{Field, FieldElement};
pub use hd::{derive_key, ChildIndex, DerivationPath, ExtendedKey};
pub use signature::{ChallengeHash, Ecdsa, EcdsaSignature, Schnorr, SchnorrSignature, SignOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
