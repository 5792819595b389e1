//! Short-Weierstrass elliptic curve groups
//!
//! Points live on `y^2 = x^3 + a*x + b` over a prime field. A [`CurveParams`]
//! carries the field, the coefficients, the generator and the group order;
//! [`CurvePoint`] values are immutable and validated at every ingress.

mod jacobian;
mod profile;
mod wnaf;

pub use profile::CurveProfile;

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::field::{Field, FieldElement};

/// SEC1 tag of the single-byte identity encoding
pub const TAG_IDENTITY: u8 = 0x00;
/// SEC1 tag of a compressed point with even y
pub const TAG_EVEN: u8 = 0x02;
/// SEC1 tag of a compressed point with odd y
pub const TAG_ODD: u8 = 0x03;
/// SEC1 tag of an uncompressed point
pub const TAG_UNCOMPRESSED: u8 = 0x04;

/// wNAF window width; arbitrary points build their odd-multiple table per
/// call, the generator's table is built once with the curve
const WNAF_WINDOW: usize = 5;

/// Affine coordinates of a point known to satisfy its curve equation
///
/// Only [`CurveParams`] builds these, so holding one means the point was
/// validated on the way in or produced by the group law.
///
/// ```compile_fail
/// use hdcurve::{AffinePoint, CurveProfile};
///
/// let field = CurveProfile::Secp256k1.params().field();
/// let _ = AffinePoint { x: field.from_u64(1), y: field.from_u64(1) };
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AffinePoint {
    x: FieldElement,
    y: FieldElement,
}

impl AffinePoint {
    pub fn x(&self) -> &FieldElement {
        &self.x
    }

    pub fn y(&self) -> &FieldElement {
        &self.y
    }
}

/// A point of the curve group
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum CurvePoint {
    /// The point at infinity
    Identity,
    /// An affine point satisfying the curve equation
    Affine(AffinePoint),
}

impl CurvePoint {
    /// Wrap coordinates the group law has already produced
    pub(crate) fn from_coordinates(x: FieldElement, y: FieldElement) -> Self {
        Self::Affine(AffinePoint { x, y })
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    pub fn x(&self) -> Option<&FieldElement> {
        match self {
            Self::Identity => None,
            Self::Affine(point) => Some(&point.x),
        }
    }

    pub fn y(&self) -> Option<&FieldElement> {
        match self {
            Self::Identity => None,
            Self::Affine(point) => Some(&point.y),
        }
    }

    /// Whether the point has an even y-coordinate (false for the identity)
    pub fn has_even_y(&self) -> bool {
        self.y().map_or(false, FieldElement::is_even)
    }
}

impl fmt::Debug for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "CurvePoint(infinity)"),
            Self::Affine(point) => write!(f, "CurvePoint({:?}, {:?})", point.x, point.y),
        }
    }
}

/// Parameters `{p, a, b, G, n}` of a short-Weierstrass curve
pub struct CurveParams {
    name: String,
    field: Field,
    scalars: Field,
    a: FieldElement,
    b: FieldElement,
    generator: CurvePoint,
    generator_table: Vec<CurvePoint>,
}

impl fmt::Debug for CurveParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveParams")
            .field("name", &self.name)
            .field("p", &self.field.modulus().to_str_radix(16))
            .field("a", &self.a)
            .field("b", &self.b)
            .field("generator", &self.generator)
            .field("n", &self.order().to_str_radix(16))
            .finish()
    }
}

impl CurveParams {
    /// Build a curve, checking that it is non-singular, that the generator is
    /// on the curve and that `n * G` is the identity.
    pub fn new(
        name: impl Into<String>,
        field: Field,
        a: BigUint,
        b: BigUint,
        generator: (BigUint, BigUint),
        order: BigUint,
    ) -> Result<Self> {
        let scalars = Field::new(order)?;
        let a = field.element(a);
        let b = field.element(b);

        // 4a^3 + 27b^2 != 0
        let discriminant = field.add(
            &field.mul_small(&field.mul(&a, &field.square(&a)), 4),
            &field.mul_small(&field.square(&b), 27),
        );
        if discriminant.is_zero() {
            return Err(Error::InvalidPoint("curve is singular".to_string()));
        }

        let mut params = Self {
            name: name.into(),
            field,
            scalars,
            a,
            b,
            generator: CurvePoint::Identity,
            generator_table: Vec::new(),
        };

        let (gx, gy) = generator;
        let generator = params.point(params.field.element(gx), params.field.element(gy))?;
        if !params.multiply(params.order(), &generator).is_identity() {
            return Err(Error::InvalidPoint("generator does not have the given order".to_string()));
        }

        params.generator_table = wnaf::odd_multiples(&params, &generator, WNAF_WINDOW);
        params.generator = generator;
        Ok(params)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base field (mod p)
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The scalar field (mod n)
    pub fn scalar_field(&self) -> &Field {
        &self.scalars
    }

    /// The group order n
    pub fn order(&self) -> &BigUint {
        self.scalars.modulus()
    }

    pub fn a(&self) -> &FieldElement {
        &self.a
    }

    pub fn b(&self) -> &FieldElement {
        &self.b
    }

    pub fn generator(&self) -> &CurvePoint {
        &self.generator
    }

    /// x^3 + a*x + b
    fn equation_rhs(&self, x: &FieldElement) -> FieldElement {
        let field = &self.field;
        let x3 = field.mul(x, &field.square(x));
        field.add(&field.add(&x3, &field.mul(&self.a, x)), &self.b)
    }

    /// Check y^2 = x^3 + a*x + b; the identity always passes
    pub fn is_on_curve(&self, point: &CurvePoint) -> bool {
        match point {
            CurvePoint::Identity => true,
            CurvePoint::Affine(AffinePoint { x, y }) => {
                x.value() < self.field.modulus()
                    && y.value() < self.field.modulus()
                    && self.field.square(y) == self.equation_rhs(x)
            }
        }
    }

    /// Construct an affine point, failing with `InvalidPoint` off the curve
    pub fn point(&self, x: FieldElement, y: FieldElement) -> Result<CurvePoint> {
        let point = CurvePoint::from_coordinates(x, y);
        if !self.is_on_curve(&point) {
            return Err(Error::InvalidPoint("point does not satisfy the curve equation".to_string()));
        }
        Ok(point)
    }

    /// Recover the point with the given x-coordinate and y parity
    pub fn lift_x(&self, x: &FieldElement, odd: bool) -> Result<CurvePoint> {
        let y = self
            .field
            .sqrt(&self.equation_rhs(x))
            .map_err(|_| Error::InvalidPoint("x-coordinate is not on the curve".to_string()))?;
        let y = if y.is_even() == odd { self.field.neg(&y) } else { y };
        if y.is_even() == odd {
            return Err(Error::InvalidPoint("no point with the requested parity".to_string()));
        }
        Ok(CurvePoint::from_coordinates(x.clone(), y))
    }

    pub fn negate(&self, point: &CurvePoint) -> CurvePoint {
        match point {
            CurvePoint::Identity => CurvePoint::Identity,
            CurvePoint::Affine(AffinePoint { x, y }) => CurvePoint::from_coordinates(x.clone(), self.field.neg(y)),
        }
    }

    /// Group law
    pub fn add(&self, p1: &CurvePoint, p2: &CurvePoint) -> CurvePoint {
        let (x1, y1, x2, y2) = match (p1, p2) {
            (CurvePoint::Identity, _) => return p2.clone(),
            (_, CurvePoint::Identity) => return p1.clone(),
            (CurvePoint::Affine(a), CurvePoint::Affine(b)) => (&a.x, &a.y, &b.x, &b.y),
        };

        let field = &self.field;
        let slope = match field.invert(&field.sub(x2, x1)) {
            Ok(inv) => field.mul(&field.sub(y2, y1), &inv),
            // x1 == x2: the same point, or a point and its inverse
            Err(_) if y1 == y2 => return self.double(p1),
            Err(_) => return CurvePoint::Identity,
        };

        let x3 = field.sub(&field.sub(&field.square(&slope), x1), x2);
        let y3 = field.sub(&field.mul(&slope, &field.sub(x1, &x3)), y1);
        CurvePoint::from_coordinates(x3, y3)
    }

    /// Tangent-line doubling
    pub fn double(&self, point: &CurvePoint) -> CurvePoint {
        let (x, y) = match point {
            CurvePoint::Identity => return CurvePoint::Identity,
            CurvePoint::Affine(AffinePoint { x, y }) => (x, y),
        };

        let field = &self.field;
        let numerator = field.add(&field.mul_small(&field.square(x), 3), &self.a);
        let slope = match field.invert(&field.mul_small(y, 2)) {
            Ok(inv) => field.mul(&numerator, &inv),
            // vertical tangent
            Err(_) => return CurvePoint::Identity,
        };

        let x3 = field.sub(&field.square(&slope), &field.mul_small(x, 2));
        let y3 = field.sub(&field.mul(&slope, &field.sub(x, &x3)), y);
        CurvePoint::from_coordinates(x3, y3)
    }

    pub fn sub(&self, p1: &CurvePoint, p2: &CurvePoint) -> CurvePoint {
        self.add(p1, &self.negate(p2))
    }

    /// `k * P` for an arbitrary non-negative integer k (not reduced mod n)
    pub fn multiply(&self, k: &BigUint, point: &CurvePoint) -> CurvePoint {
        if k.is_zero() || point.is_identity() {
            return CurvePoint::Identity;
        }
        let table = wnaf::odd_multiples(self, point, WNAF_WINDOW);
        wnaf::multiply(self, k, &table, WNAF_WINDOW)
    }

    /// `k * G` using the precomputed generator table
    pub fn multiply_generator(&self, k: &BigUint) -> CurvePoint {
        if k.is_zero() {
            return CurvePoint::Identity;
        }
        if self.generator_table.is_empty() {
            return self.multiply(k, &self.generator);
        }
        wnaf::multiply(self, k, &self.generator_table, WNAF_WINDOW)
    }

    /// `u1 * G + u2 * Q`
    pub fn multiply_add(&self, u1: &BigUint, u2: &BigUint, point: &CurvePoint) -> CurvePoint {
        self.add(&self.multiply_generator(u1), &self.multiply(u2, point))
    }

    /// SEC1 compressed encoding; the identity encodes as `[0x00]`
    pub fn compress(&self, point: &CurvePoint) -> Vec<u8> {
        match point {
            CurvePoint::Identity => vec![TAG_IDENTITY],
            CurvePoint::Affine(AffinePoint { x, y }) => {
                let mut out = Vec::with_capacity(1 + self.field.byte_len());
                out.push(if y.is_even() { TAG_EVEN } else { TAG_ODD });
                out.extend_from_slice(&self.field.to_bytes(x));
                out
            }
        }
    }

    /// SEC1 uncompressed encoding `0x04 || x || y`; the identity encodes as `[0x00]`
    pub fn serialize_uncompressed(&self, point: &CurvePoint) -> Vec<u8> {
        match point {
            CurvePoint::Identity => vec![TAG_IDENTITY],
            CurvePoint::Affine(AffinePoint { x, y }) => {
                let mut out = Vec::with_capacity(1 + 2 * self.field.byte_len());
                out.push(TAG_UNCOMPRESSED);
                out.extend_from_slice(&self.field.to_bytes(x));
                out.extend_from_slice(&self.field.to_bytes(y));
                out
            }
        }
    }

    /// Decode a compressed point (or the single-byte identity)
    pub fn decompress(&self, bytes: &[u8]) -> Result<CurvePoint> {
        if bytes == [TAG_IDENTITY] {
            return Ok(CurvePoint::Identity);
        }

        let expected = 1 + self.field.byte_len();
        if bytes.len() != expected {
            return Err(Error::length(expected, bytes.len()));
        }

        let odd = match bytes[0] {
            TAG_EVEN => false,
            TAG_ODD => true,
            tag => return Err(Error::InvalidPoint(format!("unknown compressed point tag 0x{tag:02x}"))),
        };
        let x = self
            .field
            .from_canonical_bytes(&bytes[1..])
            .ok_or_else(|| Error::InvalidPoint("x-coordinate out of range".to_string()))?;

        self.lift_x(&x, odd)
    }

    /// Decode any SEC1 encoding: identity, compressed or uncompressed
    pub fn parse_point(&self, bytes: &[u8]) -> Result<CurvePoint> {
        let width = self.field.byte_len();
        match bytes.first() {
            None => Err(Error::length(1 + width, 0)),
            Some(&TAG_UNCOMPRESSED) => {
                if bytes.len() != 1 + 2 * width {
                    return Err(Error::length(1 + 2 * width, bytes.len()));
                }
                let coordinate = |chunk: &[u8]| {
                    self.field
                        .from_canonical_bytes(chunk)
                        .ok_or_else(|| Error::InvalidPoint("coordinate out of range".to_string()))
                };
                let x = coordinate(&bytes[1..1 + width])?;
                let y = coordinate(&bytes[1 + width..])?;
                self.point(x, y)
            }
            Some(_) => self.decompress(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_curve() -> CurveParams {
        // y^2 = x^3 + 2x + 3 over F_97, generator (3, 6) of order 5
        let field = Field::new(BigUint::from(97u32)).unwrap();
        CurveParams::new(
            "toy",
            field,
            BigUint::from(2u32),
            BigUint::from(3u32),
            (BigUint::from(3u32), BigUint::from(6u32)),
            BigUint::from(5u32),
        )
        .unwrap()
    }

    #[test]
    fn test_toy_curve_group_law() {
        let curve = toy_curve();
        let g = curve.generator().clone();
        let two_g = curve.double(&g);
        assert_eq!(curve.add(&g, &g), two_g);
        assert_eq!(curve.add(&g, &CurvePoint::Identity), g);
        assert_eq!(curve.add(&CurvePoint::Identity, &g), g);
        assert!(curve.add(&g, &curve.negate(&g)).is_identity());
        assert!(curve.double(&CurvePoint::Identity).is_identity());

        let mut acc = CurvePoint::Identity;
        for k in 0..12u32 {
            assert_eq!(curve.multiply(&BigUint::from(k), &g), acc);
            assert_eq!(curve.multiply_generator(&BigUint::from(k)), acc);
            assert!(curve.is_on_curve(&acc));
            acc = curve.add(&acc, &g);
        }
    }

    #[test]
    fn test_rejects_generator_off_curve() {
        let field = Field::new(BigUint::from(97u32)).unwrap();
        let result = CurveParams::new(
            "bad",
            field,
            BigUint::from(2u32),
            BigUint::from(3u32),
            (BigUint::from(3u32), BigUint::from(7u32)),
            BigUint::from(5u32),
        );
        assert!(matches!(result, Err(Error::InvalidPoint(_))));
    }

    #[test]
    fn test_rejects_wrong_order() {
        let field = Field::new(BigUint::from(97u32)).unwrap();
        let result = CurveParams::new(
            "bad-order",
            field,
            BigUint::from(2u32),
            BigUint::from(3u32),
            (BigUint::from(3u32), BigUint::from(6u32)),
            BigUint::from(7u32),
        );
        assert!(matches!(result, Err(Error::InvalidPoint(_))));
    }

    #[test]
    fn test_rejects_singular_curve() {
        let field = Field::new(BigUint::from(97u32)).unwrap();
        let result = CurveParams::new(
            "singular",
            field,
            BigUint::zero(),
            BigUint::zero(),
            (BigUint::from(1u32), BigUint::from(1u32)),
            BigUint::from(5u32),
        );
        assert!(matches!(result, Err(Error::InvalidPoint(_))));
    }

    #[test]
    fn test_point_validation() {
        let curve = toy_curve();
        let field = curve.field();
        assert!(curve.point(field.from_u64(3), field.from_u64(6)).is_ok());
        assert!(matches!(
            curve.point(field.from_u64(3), field.from_u64(5)),
            Err(Error::InvalidPoint(_))
        ));
        assert!(curve.is_on_curve(&CurvePoint::Identity));
    }

    #[test]
    fn test_toy_compression_round_trip() {
        let curve = toy_curve();
        let mut point = CurvePoint::Identity;
        for _ in 0..5 {
            let compressed = curve.compress(&point);
            assert_eq!(curve.decompress(&compressed).unwrap(), point);
            assert_eq!(curve.parse_point(&curve.serialize_uncompressed(&point)).unwrap(), point);
            point = curve.add(&point, curve.generator());
        }
    }

    #[test]
    fn test_decompress_rejects_bad_input() {
        let curve = toy_curve();
        assert!(matches!(curve.decompress(&[0x05, 3]), Err(Error::InvalidPoint(_))));
        assert!(matches!(curve.decompress(&[0x02, 3, 0]), Err(Error::InvalidInputLength { .. })));
        // 97 is not a canonical x-coordinate
        assert!(matches!(curve.decompress(&[0x02, 97]), Err(Error::InvalidPoint(_))));
        assert!(matches!(curve.parse_point(&[]), Err(Error::InvalidInputLength { .. })));
    }
}
