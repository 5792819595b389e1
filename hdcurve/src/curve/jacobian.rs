//! Jacobian-coordinate accumulator for scalar multiplication
//!
//! `(X, Y, Z)` represents the affine point `(X / Z^2, Y / Z^3)`; `Z = 0` is the
//! identity. Only one inversion is paid, when converting back to affine.

use super::{CurveParams, CurvePoint};
use crate::field::{Field, FieldElement};

#[derive(Clone, Debug)]
pub(crate) struct JacobianPoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl JacobianPoint {
    pub(crate) fn identity(field: &Field) -> Self {
        Self {
            x: field.one(),
            y: field.one(),
            z: field.zero(),
        }
    }

    pub(crate) fn from_affine(field: &Field, point: &CurvePoint) -> Self {
        match point {
            CurvePoint::Identity => Self::identity(field),
            CurvePoint::Affine(point) => Self {
                x: point.x().clone(),
                y: point.y().clone(),
                z: field.one(),
            },
        }
    }

    pub(crate) fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    pub(crate) fn to_affine(&self, field: &Field) -> CurvePoint {
        let z_inv = match field.invert(&self.z) {
            Ok(inv) => inv,
            Err(_) => return CurvePoint::Identity,
        };
        let z_inv2 = field.square(&z_inv);
        let z_inv3 = field.mul(&z_inv2, &z_inv);

        CurvePoint::from_coordinates(field.mul(&self.x, &z_inv2), field.mul(&self.y, &z_inv3))
    }

    pub(crate) fn double(&self, curve: &CurveParams) -> Self {
        let field = curve.field();
        if self.is_identity() || self.y.is_zero() {
            return Self::identity(field);
        }

        let yy = field.square(&self.y);
        let s = field.mul_small(&field.mul(&self.x, &yy), 4);

        // m = 3x^2 + a*z^4
        let mut m = field.mul_small(&field.square(&self.x), 3);
        if !curve.a().is_zero() {
            let z4 = field.square(&field.square(&self.z));
            m = field.add(&m, &field.mul(curve.a(), &z4));
        }

        let x3 = field.sub(&field.square(&m), &field.mul_small(&s, 2));
        let y3 = field.sub(
            &field.mul(&m, &field.sub(&s, &x3)),
            &field.mul_small(&field.square(&yy), 8),
        );
        let z3 = field.mul_small(&field.mul(&self.y, &self.z), 2);

        Self { x: x3, y: y3, z: z3 }
    }

    pub(crate) fn add(&self, other: &Self, curve: &CurveParams) -> Self {
        if self.is_identity() {
            return other.clone();
        }
        if other.is_identity() {
            return self.clone();
        }

        let field = curve.field();
        let z1z1 = field.square(&self.z);
        let z2z2 = field.square(&other.z);
        let u1 = field.mul(&self.x, &z2z2);
        let u2 = field.mul(&other.x, &z1z1);
        let s1 = field.mul(&self.y, &field.mul(&other.z, &z2z2));
        let s2 = field.mul(&other.y, &field.mul(&self.z, &z1z1));

        if u1 == u2 {
            if s1 == s2 {
                return self.double(curve);
            }
            return Self::identity(field);
        }

        let h = field.sub(&u2, &u1);
        let r = field.sub(&s2, &s1);
        let hh = field.square(&h);
        let hhh = field.mul(&h, &hh);
        let v = field.mul(&u1, &hh);

        let x3 = field.sub(
            &field.sub(&field.square(&r), &hhh),
            &field.mul_small(&v, 2),
        );
        let y3 = field.sub(
            &field.mul(&r, &field.sub(&v, &x3)),
            &field.mul(&s1, &hhh),
        );
        let z3 = field.mul(&field.mul(&self.z, &other.z), &h);

        Self { x: x3, y: y3, z: z3 }
    }

    pub(crate) fn add_affine(&self, point: &CurvePoint, curve: &CurveParams) -> Self {
        self.add(&Self::from_affine(curve.field(), point), curve)
    }
}
