//! Modular arithmetic over an odd prime field
//!
//! A [`Field`] owns the modulus; [`FieldElement`]s are plain canonical values
//! in `[0, p)` and every operation goes through the field that produced them.
//! All integers are arbitrary precision, so moduli of any size are accepted.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Error, Result};

/// Candidates tried while looking for a quadratic non-residue
const NON_RESIDUE_SEARCH_LIMIT: u32 = 1 << 16;

/// An integer in `[0, p)` for the modulus of the field that created it
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// The canonical integer value
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_value(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_even(&self) -> bool {
        !self.0.bit(0)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0.to_str_radix(16))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_str_radix(16))
    }
}

#[derive(Clone, Debug)]
enum SqrtMethod {
    /// p = 3 (mod 4): sqrt(a) = a^((p + 1) / 4)
    Exponent(BigUint),
    /// p = 1 (mod 4): Tonelli-Shanks with p - 1 = q * 2^s and a non-residue z
    TonelliShanks { q: BigUint, s: u64, z: BigUint },
}

/// A prime field of configurable modulus
#[derive(Clone, Debug)]
pub struct Field {
    modulus: BigUint,
    byte_len: usize,
    sqrt: SqrtMethod,
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.modulus == other.modulus
    }
}

impl Eq for Field {}

impl Field {
    /// Create a field for an odd prime modulus.
    ///
    /// Primality is not checked; an odd composite modulus gives meaningless
    /// inverses and square roots.
    pub fn new(modulus: BigUint) -> Result<Self> {
        if modulus < BigUint::from(3u32) || !modulus.bit(0) {
            return Err(Error::InvalidModulus(format!(
                "expected an odd prime, got 0x{}",
                modulus.to_str_radix(16)
            )));
        }

        let byte_len = ((modulus.bits() + 7) / 8) as usize;
        let sqrt = Self::sqrt_method(&modulus)?;

        Ok(Self { modulus, byte_len, sqrt })
    }

    /// Create a field from a big-endian hex modulus
    pub fn from_hex(hex: &str) -> Result<Self> {
        let modulus = BigUint::parse_bytes(hex.as_bytes(), 16)
            .ok_or_else(|| Error::InvalidModulus(format!("not a hex integer: {hex}")))?;
        Self::new(modulus)
    }

    fn sqrt_method(p: &BigUint) -> Result<SqrtMethod> {
        if p.bit(1) {
            return Ok(SqrtMethod::Exponent((p + 1u32) >> 2u32));
        }

        let p_minus_one = p - 1u32;
        let s = p_minus_one.trailing_zeros().unwrap_or(0);
        let q = &p_minus_one >> s;
        let euler = &p_minus_one >> 1u32;

        let mut z = BigUint::from(2u32);
        for _ in 0..NON_RESIDUE_SEARCH_LIMIT {
            if z >= *p {
                break;
            }
            if z.modpow(&euler, p) == p_minus_one {
                return Ok(SqrtMethod::TonelliShanks { q, s, z });
            }
            z += 1u32;
        }

        Err(Error::InvalidModulus("no quadratic non-residue found".to_string()))
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Width of a canonical big-endian encoding
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn zero(&self) -> FieldElement {
        FieldElement(BigUint::zero())
    }

    pub fn one(&self) -> FieldElement {
        FieldElement(BigUint::one())
    }

    /// Reduce an arbitrary integer into the field
    pub fn element(&self, value: BigUint) -> FieldElement {
        FieldElement(value % &self.modulus)
    }

    pub fn from_u64(&self, value: u64) -> FieldElement {
        self.element(BigUint::from(value))
    }

    /// Interpret big-endian bytes of any length, reducing mod p
    pub fn from_bytes_reduced(&self, bytes: &[u8]) -> FieldElement {
        self.element(BigUint::from_bytes_be(bytes))
    }

    /// Accept a value only if it is already reduced
    pub fn from_canonical(&self, value: BigUint) -> Option<FieldElement> {
        (value < self.modulus).then_some(FieldElement(value))
    }

    /// Accept exactly `byte_len` big-endian bytes encoding a value below p
    pub fn from_canonical_bytes(&self, bytes: &[u8]) -> Option<FieldElement> {
        if bytes.len() != self.byte_len {
            return None;
        }
        self.from_canonical(BigUint::from_bytes_be(bytes))
    }

    /// Fixed-width big-endian encoding
    pub fn to_bytes(&self, a: &FieldElement) -> Vec<u8> {
        to_fixed_bytes(&a.0, self.byte_len)
    }

    pub fn add(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        let sum = &a.0 + &b.0;
        if sum >= self.modulus {
            FieldElement(sum - &self.modulus)
        } else {
            FieldElement(sum)
        }
    }

    pub fn sub(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        if a.0 >= b.0 {
            FieldElement(&a.0 - &b.0)
        } else {
            FieldElement(&self.modulus - (&b.0 - &a.0))
        }
    }

    pub fn neg(&self, a: &FieldElement) -> FieldElement {
        if a.is_zero() {
            self.zero()
        } else {
            FieldElement(&self.modulus - &a.0)
        }
    }

    pub fn mul(&self, a: &FieldElement, b: &FieldElement) -> FieldElement {
        FieldElement((&a.0 * &b.0) % &self.modulus)
    }

    pub fn square(&self, a: &FieldElement) -> FieldElement {
        self.mul(a, a)
    }

    /// Multiply by a small constant
    pub fn mul_small(&self, a: &FieldElement, k: u32) -> FieldElement {
        FieldElement((&a.0 * k) % &self.modulus)
    }

    /// Exponentiation by repeated squaring
    pub fn pow(&self, a: &FieldElement, exponent: &BigUint) -> FieldElement {
        FieldElement(a.0.modpow(exponent, &self.modulus))
    }

    /// Multiplicative inverse by Fermat's little theorem
    pub fn invert(&self, a: &FieldElement) -> Result<FieldElement> {
        if a.is_zero() {
            return Err(Error::DivisionByZero);
        }
        Ok(self.pow(a, &(&self.modulus - 2u32)))
    }

    pub fn div(&self, a: &FieldElement, b: &FieldElement) -> Result<FieldElement> {
        Ok(self.mul(a, &self.invert(b)?))
    }

    /// Euler's criterion; zero counts as a square
    pub fn is_square(&self, a: &FieldElement) -> bool {
        if a.is_zero() {
            return true;
        }
        let euler = (&self.modulus - 1u32) >> 1u32;
        self.pow(a, &euler).0.is_one()
    }

    /// Square root, returning the even root of the pair `{r, p - r}`
    pub fn sqrt(&self, a: &FieldElement) -> Result<FieldElement> {
        if a.is_zero() {
            return Ok(self.zero());
        }

        let root = match &self.sqrt {
            SqrtMethod::Exponent(exponent) => self.pow(a, exponent),
            SqrtMethod::TonelliShanks { q, s, z } => self.tonelli_shanks(a, q, *s, z)?,
        };

        if self.square(&root) != *a {
            return Err(Error::NoSquareRoot);
        }

        Ok(if root.is_even() { root } else { self.neg(&root) })
    }

    fn tonelli_shanks(
        &self,
        a: &FieldElement,
        q: &BigUint,
        s: u64,
        z: &BigUint,
    ) -> Result<FieldElement> {
        if !self.is_square(a) {
            return Err(Error::NoSquareRoot);
        }

        let p = &self.modulus;
        let mut m = s;
        let mut c = z.modpow(q, p);
        let mut t = a.0.modpow(q, p);
        let mut r = a.0.modpow(&((q + 1u32) >> 1u32), p);

        while !t.is_one() {
            // least i in (0, m) with t^(2^i) = 1
            let mut i = 0u64;
            let mut t_pow = t.clone();
            while !t_pow.is_one() {
                t_pow = (&t_pow * &t_pow) % p;
                i += 1;
                if i == m {
                    return Err(Error::NoSquareRoot);
                }
            }

            let b = c.modpow(&(BigUint::one() << (m - i - 1)), p);
            m = i;
            c = (&b * &b) % p;
            t = (&t * &c) % p;
            r = (&r * &b) % p;
        }

        Ok(FieldElement(r))
    }
}

/// Big-endian encoding left-padded to `len` bytes
pub(crate) fn to_fixed_bytes(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= len {
        return bytes[bytes.len() - len..].to_vec();
    }
    let mut out = vec![0u8; len - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(p: u32) -> Field {
        Field::new(BigUint::from(p)).unwrap()
    }

    #[test]
    fn test_rejects_even_and_tiny_moduli() {
        assert!(matches!(Field::new(BigUint::from(10u32)), Err(Error::InvalidModulus(_))));
        assert!(matches!(Field::new(BigUint::from(1u32)), Err(Error::InvalidModulus(_))));
        assert!(Field::from_hex("zz").is_err());
    }

    #[test]
    fn test_elements_are_reduced() {
        let field = small(23);
        assert_eq!(field.from_u64(30), field.from_u64(7));
        assert_eq!(field.from_bytes_reduced(&[0x01, 0x00]).value(), &BigUint::from(256u32 % 23));
        assert!(field.from_canonical(BigUint::from(23u32)).is_none());
        assert!(field.from_canonical(BigUint::from(22u32)).is_some());
        assert!(field.from_canonical_bytes(&[0x00, 0x01]).is_none());
    }

    #[test]
    fn test_add_sub_neg_are_consistent() {
        let field = small(23);
        for a in 0..23u64 {
            for b in 0..23u64 {
                let (fa, fb) = (field.from_u64(a), field.from_u64(b));
                assert_eq!(field.sub(&fa, &fb), field.add(&fa, &field.neg(&fb)));
                assert_eq!(field.add(&field.sub(&fa, &fb), &fb), fa);
            }
        }
    }

    #[test]
    fn test_invert_round_trip() {
        for p in [13u32, 17, 23] {
            let field = small(p);
            for a in 1..p as u64 {
                let fa = field.from_u64(a);
                let inv = field.invert(&fa).unwrap();
                assert_eq!(field.mul(&fa, &inv), field.one());
                assert_eq!(field.invert(&inv).unwrap(), fa);
            }
        }
    }

    #[test]
    fn test_invert_zero_fails() {
        let field = small(23);
        assert_eq!(field.invert(&field.zero()), Err(Error::DivisionByZero));
        assert_eq!(field.div(&field.one(), &field.zero()), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_sqrt_three_mod_four() {
        let field = small(23);
        // 5 is a non-residue mod 23
        assert_eq!(field.sqrt(&field.from_u64(5)), Err(Error::NoSquareRoot));
        let root = field.sqrt(&field.from_u64(2)).unwrap();
        assert_eq!(field.square(&root), field.from_u64(2));
        assert!(root.is_even());
    }

    #[test]
    fn test_sqrt_tonelli_shanks() {
        let field = small(17);
        assert_eq!(field.sqrt(&field.from_u64(2)).unwrap(), field.from_u64(6));
        assert_eq!(field.sqrt(&field.from_u64(3)), Err(Error::NoSquareRoot));

        let field = small(13);
        assert_eq!(field.sqrt(&field.from_u64(10)).unwrap(), field.from_u64(6));
        assert_eq!(field.sqrt(&field.from_u64(3)).unwrap(), field.from_u64(4));
        assert_eq!(field.sqrt(&field.from_u64(2)), Err(Error::NoSquareRoot));
    }

    #[test]
    fn test_sqrt_covers_every_residue() {
        for p in [13u32, 17, 23, 41] {
            let field = small(p);
            let mut residues = 0;
            for a in 0..p as u64 {
                let fa = field.from_u64(a);
                match field.sqrt(&fa) {
                    Ok(root) => {
                        assert_eq!(field.square(&root), fa);
                        assert!(root.is_even());
                        assert!(field.is_square(&fa));
                        residues += 1;
                    }
                    Err(err) => {
                        assert_eq!(err, Error::NoSquareRoot);
                        assert!(!field.is_square(&fa));
                    }
                }
            }
            assert_eq!(residues, (p + 1) / 2);
        }
    }

    #[test]
    fn test_pow_small_exponents() {
        let field = small(23);
        let x = field.from_u64(3);
        assert_eq!(field.pow(&x, &BigUint::from(5u32)), field.from_u64(243 % 23));
        assert_eq!(field.pow(&x, &BigUint::zero()), field.one());
    }

    #[test]
    fn test_fixed_width_encoding() {
        let field = Field::from_hex("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f").unwrap();
        assert_eq!(field.byte_len(), 32);
        let bytes = field.to_bytes(&field.from_u64(1));
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 1);
        assert!(bytes[..31].iter().all(|b| *b == 0));
        assert_eq!(field.from_canonical_bytes(&bytes), Some(field.one()));
    }
}
