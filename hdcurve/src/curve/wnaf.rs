//! Windowed non-adjacent form scalar multiplication

use num_bigint::BigUint;
use num_traits::Zero;

use super::jacobian::JacobianPoint;
use super::{CurveParams, CurvePoint};

/// Recode `k` into signed digits, least significant first.
///
/// Every non-zero digit is odd with `|d| < 2^(width - 1)`, and any `width`
/// consecutive digits hold at most one non-zero value.
pub(crate) fn recode(k: &BigUint, width: usize) -> Vec<i32> {
    let window = 1u64 << width;
    let half = window >> 1;
    let mask = window - 1;

    let mut k = k.clone();
    let mut digits = Vec::with_capacity(k.bits() as usize + 1);

    while !k.is_zero() {
        let digit = if k.bit(0) {
            let low = k.iter_u64_digits().next().unwrap_or(0) & mask;
            if low >= half {
                k += window - low;
                low as i32 - window as i32
            } else {
                k -= low;
                low as i32
            }
        } else {
            0
        };
        digits.push(digit);
        k >>= 1u32;
    }

    digits
}

/// Affine odd multiples `P, 3P, 5P, ..., (2^(width-1) - 1)P`
pub(crate) fn odd_multiples(curve: &CurveParams, point: &CurvePoint, width: usize) -> Vec<CurvePoint> {
    let count = 1usize << (width - 2);
    let twice = curve.double(point);

    let mut table = Vec::with_capacity(count);
    table.push(point.clone());
    for i in 1..count {
        let next = curve.add(&table[i - 1], &twice);
        table.push(next);
    }
    table
}

/// Evaluate `k * P` given the odd-multiple table of `P` built with the same width
pub(crate) fn multiply(curve: &CurveParams, k: &BigUint, table: &[CurvePoint], width: usize) -> CurvePoint {
    let field = curve.field();
    let mut acc = JacobianPoint::identity(field);

    for &digit in recode(k, width).iter().rev() {
        acc = acc.double(curve);
        if digit > 0 {
            acc = acc.add_affine(&table[(digit as usize - 1) / 2], curve);
        } else if digit < 0 {
            let negated = curve.negate(&table[(digit.unsigned_abs() as usize - 1) / 2]);
            acc = acc.add_affine(&negated, curve);
        }
    }

    acc.to_affine(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn evaluate(digits: &[i32]) -> BigInt {
        digits
            .iter()
            .enumerate()
            .fold(BigInt::zero(), |acc, (i, d)| acc + (BigInt::from(*d) << i))
    }

    #[test]
    fn test_recode_reconstructs_scalar() {
        let samples = [
            BigUint::from(1u32),
            BigUint::from(7u32),
            BigUint::from(0xdeadbeefu64),
            BigUint::parse_bytes(b"fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140", 16).unwrap(),
        ];
        for width in [4usize, 5, 7] {
            for k in &samples {
                let digits = recode(k, width);
                assert_eq!(evaluate(&digits), BigInt::from(k.clone()));
            }
        }
    }

    #[test]
    fn test_recode_digit_shape() {
        let k = BigUint::parse_bytes(b"79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798", 16).unwrap();
        let width = 5;
        let digits = recode(&k, width);
        for (i, d) in digits.iter().enumerate() {
            if *d != 0 {
                assert_eq!(d.rem_euclid(2), 1);
                assert!(d.unsigned_abs() < 1 << (width - 1));
                let window_end = (i + width).min(digits.len());
                assert!(digits[i + 1..window_end].iter().all(|x| *x == 0));
            }
        }
    }

    #[test]
    fn test_recode_zero_is_empty() {
        assert!(recode(&BigUint::zero(), 5).is_empty());
    }
}
