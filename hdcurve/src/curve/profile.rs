//! Built-in curve profiles

use std::fmt;
use std::sync::LazyLock;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::CurveParams;
use crate::field::Field;

/// Closed set of supported curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveProfile {
    /// secp256k1 (Bitcoin, Ethereum)
    Secp256k1,
    /// NIST P-256 / secp256r1
    NistP256,
}

struct Constants {
    name: &'static str,
    p: &'static str,
    a: &'static str,
    b: &'static str,
    gx: &'static str,
    gy: &'static str,
    n: &'static str,
}

const SECP256K1: Constants = Constants {
    name: "secp256k1",
    p: "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
    a: "0",
    b: "7",
    gx: "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
    gy: "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
    n: "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
};

const NIST_P256: Constants = Constants {
    name: "nist-p256",
    p: "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
    a: "ffffffff00000001000000000000000000000000fffffffffffffffffffffffc",
    b: "5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
    gx: "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
    gy: "4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
    n: "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551",
};

static SECP256K1_PARAMS: LazyLock<CurveParams> = LazyLock::new(|| build(&SECP256K1));
static NIST_P256_PARAMS: LazyLock<CurveParams> = LazyLock::new(|| build(&NIST_P256));

fn hex_int(value: &str) -> BigUint {
    BigUint::parse_bytes(value.as_bytes(), 16).expect("curve constant is valid hex")
}

fn build(constants: &Constants) -> CurveParams {
    trace!(curve = constants.name, "building curve parameters and generator table");
    let field = Field::new(hex_int(constants.p)).expect("curve modulus is an odd prime");
    CurveParams::new(
        constants.name,
        field,
        hex_int(constants.a),
        hex_int(constants.b),
        (hex_int(constants.gx), hex_int(constants.gy)),
        hex_int(constants.n),
    )
    .expect("built-in curve parameters are consistent")
}

impl CurveProfile {
    pub const ALL: [CurveProfile; 2] = [CurveProfile::Secp256k1, CurveProfile::NistP256];

    /// Shared parameters of this profile, built on first use
    pub fn params(self) -> &'static CurveParams {
        match self {
            CurveProfile::Secp256k1 => &SECP256K1_PARAMS,
            CurveProfile::NistP256 => &NIST_P256_PARAMS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CurveProfile::Secp256k1 => SECP256K1.name,
            CurveProfile::NistP256 => NIST_P256.name,
        }
    }

    /// HMAC key used to turn a seed into a master extended key
    pub fn hd_seed_key(self) -> &'static [u8] {
        match self {
            CurveProfile::Secp256k1 => b"Bitcoin seed",
            CurveProfile::NistP256 => b"Nist256p1 seed",
        }
    }
}

impl fmt::Display for CurveProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
