// src/curves/elliptic_curve.rs
//! Montgomery curves b·y² = x³ + a·x² + x over Fp² with affine point arithmetic.
//! The point at infinity is carried in-band as the sentinel x = (0, 0), y = (1, 0),
//! which is never a point of the curve (x = 0 forces y = 0). Every operation
//! returns a fresh value; curves and points are small `Copy` types.

use std::fmt;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::arithmetic::{fp::Fp, fp2::Fp2};

/// Point on a Montgomery curve in affine coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffinePoint {
    x: Fp2,
    y: Fp2,
}

/// Montgomery curve b·y² = x³ + a·x² + x
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EllipticCurve {
    a: Fp2,
    b: Fp2,
}

/// How a pair of summands is handled by [`EllipticCurve::add_points`].
///
/// The chord formula divides by x2 - x1, so the coincident-x cases have to
/// be dispatched before it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionCase {
    /// The left summand is infinity; the result is the right summand
    LeftIdentity,
    /// The right summand is infinity; the result is the left summand
    RightIdentity,
    /// Both summands are equal; the tangent formula applies
    Doubling,
    /// The summands are inverses; the result is infinity
    Inverse,
    /// Distinct x-coordinates; the chord formula applies
    Generic,
}

impl AffinePoint {
    /// Create a point from its coordinates without checking curve membership
    pub const fn new(x: Fp2, y: Fp2) -> Self {
        Self { x, y }
    }

    /// The point at infinity, encoded as x = (0, 0), y = (1, 0)
    pub const fn infinity() -> Self {
        Self {
            x: Fp2::ZERO,
            y: Fp2::ONE,
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_constant(0, 0) && self.y.is_constant(1, 0)
    }

    pub fn x(&self) -> Fp2 {
        self.x
    }

    pub fn y(&self) -> Fp2 {
        self.y
    }

    /// -P = (x, -y); infinity is its own inverse
    pub fn negate(&self) -> Self {
        if self.is_infinity() {
            return *self;
        }
        Self {
            x: self.x,
            y: -self.y,
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y)
    }
}

impl Zeroize for AffinePoint {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
    }
}

impl fmt::Display for AffinePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x = [{}, {}], y = [{}, {}]}}",
            self.x.x0(),
            self.x.x1(),
            self.y.x0(),
            self.y.x1()
        )
    }
}

impl EllipticCurve {
    pub const fn new(a: Fp2, b: Fp2) -> Self {
        Self { a, b }
    }

    /// Coefficient a of the curve equation
    pub fn a(&self) -> Fp2 {
        self.a
    }

    /// Coefficient b of the curve equation
    pub fn b(&self) -> Fp2 {
        self.b
    }

    /// Right-hand side of the curve equation: x³ + a·x² + x
    pub fn rhs(&self, x: &Fp2) -> Fp2 {
        let x_sq = x.square();
        x_sq * *x + self.a * x_sq + *x
    }

    /// Check b·y² = x³ + a·x² + x. Infinity is always on the curve.
    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        if point.is_infinity() {
            return true;
        }
        self.b * point.y.square() == self.rhs(&point.x)
    }

    /// Recover a point with the given x-coordinate.
    ///
    /// The y-coordinate is the canonical square root of (x³ + a·x² + x)/b, so
    /// the result is only on the curve when that value is a square in Fp².
    pub fn lift_x(&self, x: Fp2) -> AffinePoint {
        let y = (self.rhs(&x) * self.b.invert()).sqrt();
        AffinePoint { x, y }
    }

    /// Decide which branch of the group law applies to P + Q
    pub fn classify_addition(&self, p: &AffinePoint, q: &AffinePoint) -> AdditionCase {
        if p.is_infinity() {
            AdditionCase::LeftIdentity
        } else if q.is_infinity() {
            AdditionCase::RightIdentity
        } else if p.x == q.x && p.y == q.y {
            AdditionCase::Doubling
        } else if p.x == q.x && p.y == -q.y {
            AdditionCase::Inverse
        } else {
            AdditionCase::Generic
        }
    }

    /// Double a point with the tangent formula.
    ///
    /// With λ = (3x² + 2a·x + 1)/(2b·y):
    /// x3 = b·λ² - a - 2x and y3 = (3x + a)·λ - b·λ³ - y.
    /// Points with y = -y (2-torsion) double to infinity.
    pub fn double_point(&self, p: &AffinePoint) -> AffinePoint {
        if p.is_infinity() || p.y == -p.y {
            return AffinePoint::infinity();
        }

        let x_sq = p.x.square();
        let numerator = x_sq.double() + x_sq + (self.a * p.x).double() + Fp2::ONE;
        let lambda = numerator * (self.b * p.y).double().invert();
        let lambda_sq = lambda.square();

        let x3 = self.b * lambda_sq - self.a - p.x - p.x;
        let y3 = (p.x.double() + p.x + self.a) * lambda - self.b * lambda_sq * lambda - p.y;
        AffinePoint { x: x3, y: y3 }
    }

    /// Add two points with the full case analysis of [`AdditionCase`].
    ///
    /// In the generic case, with λ = (y2 - y1)/(x2 - x1):
    /// x3 = b·λ² - a - x1 - x2 and y3 = (2x1 + x2 + a)·λ - b·λ³ - y1.
    pub fn add_points(&self, p: &AffinePoint, q: &AffinePoint) -> AffinePoint {
        match self.classify_addition(p, q) {
            AdditionCase::LeftIdentity => *q,
            AdditionCase::RightIdentity => *p,
            AdditionCase::Doubling => self.double_point(p),
            AdditionCase::Inverse => AffinePoint::infinity(),
            AdditionCase::Generic => {
                let lambda = (q.y - p.y) * (q.x - p.x).invert();
                let lambda_sq = lambda.square();

                let x3 = self.b * lambda_sq - self.a - p.x - q.x;
                let y3 = (p.x.double() + q.x + self.a) * lambda - self.b * lambda_sq * lambda - p.y;
                AffinePoint { x: x3, y: y3 }
            }
        }
    }

    /// [3]P = P + [2]P
    pub fn triple_point(&self, p: &AffinePoint) -> AffinePoint {
        self.add_points(p, &self.double_point(p))
    }

    /// [2^e]P by e successive doublings
    pub fn double_point_times(&self, p: &AffinePoint, e: u32) -> AffinePoint {
        (0..e).fold(*p, |acc, _| self.double_point(&acc))
    }

    /// [3^e]P by e successive triplings
    pub fn triple_point_times(&self, p: &AffinePoint, e: u32) -> AffinePoint {
        (0..e).fold(*p, |acc, _| self.triple_point(&acc))
    }

    /// Multiply a point by a scalar using the double-and-add algorithm.
    ///
    /// Bits `msb - 1` down to 0 of the scalar are scanned; the accumulator
    /// starts at infinity and is doubled every step, with P added for each set
    /// bit. Bits at or above `msb` are ignored.
    pub fn scalar_mul(&self, scalar: &Fp, point: &AffinePoint, msb: u32) -> AffinePoint {
        let mut result = AffinePoint::infinity();
        for i in (0..msb).rev() {
            result = self.double_point(&result);
            if scalar.is_bit_set(i) {
                result = self.add_points(&result, point);
            }
        }
        result
    }

    /// j(E) = 256·(a² - 3)³ / (a² - 4)
    ///
    /// The j-invariant identifies the curve up to isomorphism over the
    /// algebraic closure, which is what makes it usable as a shared secret.
    pub fn j_invariant(&self) -> Fp2 {
        let a_sq = self.a.square();
        let t = a_sq - Fp2::constant(3);
        let numerator = Fp2::constant(256) * t.square() * t;
        numerator * (a_sq - Fp2::constant(4)).invert()
    }
}

impl fmt::Display for EllipticCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{a = [{}, {}], b = [{}, {}]}}",
            self.a.x0(),
            self.a.x1(),
            self.b.x0(),
            self.b.x1()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SidhParams;
    use proptest::prelude::*;

    fn params() -> &'static SidhParams {
        SidhParams::global().expect("built-in parameters must be valid")
    }

    #[test]
    fn test_base_points_lie_on_starting_curve() {
        let params = params();
        let curve = params.starting_curve;
        for point in [params.p2, params.q2, params.p3, params.q3] {
            assert!(curve.is_on_curve(&point), "base point must satisfy the curve equation");
            assert!(!point.is_infinity());
        }
    }

    #[test]
    fn test_infinity_sentinel() {
        let infinity = AffinePoint::infinity();
        assert!(infinity.is_infinity());
        assert_eq!(infinity.x(), Fp2::ZERO);
        assert_eq!(infinity.y(), Fp2::ONE);
        assert_eq!(infinity.negate(), infinity);
        assert_eq!(
            infinity.to_string(),
            "{x = [0x00000000, 0x00000000], y = [0x00000001, 0x00000000]}"
        );

        let curve = params().starting_curve;
        assert!(curve.is_on_curve(&infinity));
        assert!(curve.double_point(&infinity).is_infinity());
    }

    #[test]
    fn test_identity_laws() {
        let params = params();
        let curve = params.starting_curve;
        let p = params.p2;
        let infinity = AffinePoint::infinity();

        assert_eq!(curve.classify_addition(&infinity, &p), AdditionCase::LeftIdentity);
        assert_eq!(curve.classify_addition(&p, &infinity), AdditionCase::RightIdentity);
        assert_eq!(curve.classify_addition(&p, &p), AdditionCase::Doubling);
        assert_eq!(curve.classify_addition(&p, &p.negate()), AdditionCase::Inverse);
        assert_eq!(curve.classify_addition(&p, &params.q2), AdditionCase::Generic);

        assert_eq!(curve.add_points(&infinity, &p), p);
        assert_eq!(curve.add_points(&p, &infinity), p);
        assert!(curve.add_points(&p, &p.negate()).is_infinity());
        assert_eq!(curve.add_points(&p, &p), curve.double_point(&p));
    }

    #[test]
    fn test_closure_of_group_law() {
        let params = params();
        let curve = params.starting_curve;

        let doubled = curve.double_point(&params.p3);
        let sum = curve.add_points(&params.p3, &params.q3);
        let tripled = curve.triple_point(&params.p2);

        assert!(curve.is_on_curve(&doubled));
        assert!(curve.is_on_curve(&sum));
        assert!(curve.is_on_curve(&tripled));
        assert_eq!(tripled, curve.add_points(&params.p2, &curve.double_point(&params.p2)));
    }

    #[test]
    fn test_addition_is_commutative_and_associative() {
        let params = params();
        let curve = params.starting_curve;
        let (p, q, r) = (params.p2, params.q2, curve.double_point(&params.p2));

        assert_eq!(curve.add_points(&p, &q), curve.add_points(&q, &p));
        assert_eq!(
            curve.add_points(&curve.add_points(&p, &q), &r),
            curve.add_points(&p, &curve.add_points(&q, &r))
        );
    }

    #[test]
    fn test_base_point_orders() {
        let params = params();
        let curve = params.starting_curve;

        for point in [params.p2, params.q2] {
            assert!(!curve.double_point_times(&point, params.e2 - 1).is_infinity());
            assert!(curve.double_point_times(&point, params.e2).is_infinity());
        }
        for point in [params.p3, params.q3] {
            assert!(!curve.triple_point_times(&point, params.e3 - 1).is_infinity());
            assert!(curve.triple_point_times(&point, params.e3).is_infinity());
        }
    }

    #[test]
    fn test_two_torsion_point_doubles_to_infinity() {
        let params = params();
        let curve = params.starting_curve;
        let order_two = curve.double_point_times(&params.p2, params.e2 - 1);
        assert!(order_two.y().is_zero());
        assert!(curve.double_point(&order_two).is_infinity());
    }

    #[test]
    fn test_scalar_multiplication_small_scalars() {
        let params = params();
        let curve = params.starting_curve;
        let p = params.p2;

        assert!(curve.scalar_mul(&Fp::ZERO, &p, params.msb_a).is_infinity());
        assert_eq!(curve.scalar_mul(&Fp::ONE, &p, params.msb_a), p);
        assert_eq!(curve.scalar_mul(&Fp::new(2), &p, params.msb_a), curve.double_point(&p));

        let four_p = curve.double_point_times(&p, 2);
        assert_eq!(curve.scalar_mul(&Fp::new(5), &p, params.msb_a), curve.add_points(&four_p, &p));
    }

    #[test]
    fn test_scalar_multiplication_ignores_bits_above_width() {
        let params = params();
        let curve = params.starting_curve;
        let p = params.p3;
        let narrow = curve.scalar_mul(&Fp::new(0b1011), &p, 3);
        assert_eq!(narrow, curve.scalar_mul(&Fp::new(0b011), &p, 3));
    }

    #[test]
    fn test_curve_display() {
        assert_eq!(
            params().starting_curve.to_string(),
            "{a = [0x00000006, 0x00000000], b = [0x00000001, 0x00000000]}"
        );
    }

    #[test]
    fn test_j_invariant_of_starting_curve() {
        // a = 6: 256·33³/32 = 287496
        let j = params().starting_curve.j_invariant();
        assert_eq!(j, Fp2::constant(287_496));
    }

    #[test]
    fn test_lift_x_recovers_point_up_to_sign() {
        let params = params();
        let curve = params.starting_curve;
        for point in [params.p2, params.q2, params.p3, params.q3] {
            let lifted = curve.lift_x(point.x());
            assert!(curve.is_on_curve(&lifted));
            assert!(lifted == point || lifted == point.negate());
        }
    }

    #[test]
    fn test_off_curve_point_is_rejected() {
        let curve = params().starting_curve;
        let bogus = AffinePoint::new(Fp2::constant(1), Fp2::constant(1));
        assert!(!curve.is_on_curve(&bogus));
    }

    proptest! {
        #[test]
        fn test_scalar_multiplication_is_linear(k1 in 0u32..128, k2 in 0u32..128) {
            let params = params();
            let curve = params.starting_curve;
            let p = params.p3;

            let lhs = curve.scalar_mul(&Fp::new(k1 + k2), &p, params.msb_b);
            let rhs = curve.add_points(
                &curve.scalar_mul(&Fp::new(k1), &p, params.msb_b),
                &curve.scalar_mul(&Fp::new(k2), &p, params.msb_b),
            );
            prop_assert_eq!(lhs, rhs);
            prop_assert!(curve.is_on_curve(&lhs));
        }

        #[test]
        fn test_multiples_stay_on_curve(k in 0u32..(1 << 15)) {
            let params = params();
            let curve = params.starting_curve;
            let point = curve.scalar_mul(&Fp::new(k), &params.q2, params.msb_a);
            prop_assert!(curve.is_on_curve(&point));
            prop_assert!(curve.is_on_curve(&curve.double_point(&point)));
        }
    }
}
