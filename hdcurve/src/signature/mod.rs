//! Signature schemes over the curve group
//!
//! Both schemes take the signer's private key as fixed-width big-endian bytes.
//! ECDSA signs a digest produced by the caller; Schnorr hashes the message itself.

mod ecdsa;
mod rfc6979;
mod schnorr;

pub use ecdsa::{Ecdsa, EcdsaSignature, SignOptions};
pub use schnorr::{ChallengeHash, Schnorr, SchnorrSignature};
