//! Error types for the hdcurve library

use thiserror::Error;

/// Custom error type for field, curve, signature and derivation operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Element has no square root in the field")]
    NoSquareRoot,

    #[error("Invalid modulus: {0}")]
    InvalidModulus(String),

    #[error("Invalid curve point: {0}")]
    InvalidPoint(String),

    #[error("Point at infinity")]
    PointAtInfinity,

    #[error("Signature nonce produced r = 0")]
    ZeroR,

    #[error("Signature nonce produced s = 0")]
    ZeroS,

    #[error("Derived nonce is zero")]
    ZeroNonce,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Invalid input length: expected {expected} bytes, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Hardened child {0} cannot be derived from a public key")]
    PublicDerivationUnavailable(u32),

    #[error("Invalid child key at index {0}")]
    InvalidChildKey(u32),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Seed produced an invalid master key")]
    InvalidSeed,

    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("HMAC error: {0}")]
    Hmac(String),
}

impl Error {
    pub(crate) fn length(expected: usize, actual: usize) -> Self {
        Self::InvalidInputLength { expected, actual }
    }
}

/// Result type for hdcurve operations
pub type Result<T> = std::result::Result<T, Error>;
