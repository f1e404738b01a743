// src/curves/isogeny.rs
//! Explicit isogenies of degree 2, 3 and 4 between Montgomery curves.
//! Each isogeny is determined by the x-coordinate of a kernel generator. The
//! codomain coefficients and the point map are closed-form rational functions
//! of that coordinate; kernel points, where the denominators vanish, map to
//! the point at infinity of the codomain.

use crate::arithmetic::fp2::Fp2;
use crate::curves::elliptic_curve::{AffinePoint, EllipticCurve};

/// Isogeny with a cyclic kernel generated by a single point
pub trait Isogeny: Sized {
    /// Size of the kernel
    const DEGREE: u32;

    /// Build the isogeny whose kernel is generated by `kernel`, a point of
    /// exact order [`Isogeny::DEGREE`]
    fn from_kernel(kernel: &AffinePoint) -> Self;

    /// Image curve of `domain` under this isogeny
    fn codomain(&self, domain: &EllipticCurve) -> EllipticCurve;

    /// Image of a point; infinity and kernel points map to infinity
    fn evaluate(&self, point: &AffinePoint) -> AffinePoint;
}

/// Degree-2 isogeny with kernel {∞, (x2, 0)}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoIsogeny {
    x2: Fp2,
}

/// Degree-3 isogeny with kernel {∞, (x3, ±y3)}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreeIsogeny {
    x3: Fp2,
}

/// Degree-4 isogeny with kernel {∞, (x4, ±y4), [2](x4, y4)}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourIsogeny {
    x4: Fp2,
}

impl Isogeny for TwoIsogeny {
    const DEGREE: u32 = 2;

    fn from_kernel(kernel: &AffinePoint) -> Self {
        Self { x2: kernel.x() }
    }

    /// aa = 2·(1 - 2·x2²), bb = x2·b
    fn codomain(&self, domain: &EllipticCurve) -> EllipticCurve {
        let x2 = self.x2;
        let aa = (Fp2::ONE - x2.square().double()).double();
        let bb = x2 * domain.b();
        EllipticCurve::new(aa, bb)
    }

    /// xx = (x²·x2 - x)/(x - x2), yy = y·(x²·x2 - 2x·x2² + x2)/(x - x2)²
    fn evaluate(&self, point: &AffinePoint) -> AffinePoint {
        let x2 = self.x2;
        let (x, y) = (point.x(), point.y());
        if point.is_infinity() || x == x2 {
            return AffinePoint::infinity();
        }

        let x_x2 = x * x2;
        let x_sq_x2 = x * x_x2;
        let y_numerator = y * (x_sq_x2 - (x_x2 * x2).double() + x2);
        let denominator_inv = (x - x2).invert();

        let xx = (x_sq_x2 - x) * denominator_inv;
        let yy = y_numerator * denominator_inv.square();
        AffinePoint::new(xx, yy)
    }
}

impl Isogeny for ThreeIsogeny {
    const DEGREE: u32 = 3;

    fn from_kernel(kernel: &AffinePoint) -> Self {
        Self { x3: kernel.x() }
    }

    /// aa = (a·x3 - 6·x3² + 6)·x3, bb = b·x3²
    fn codomain(&self, domain: &EllipticCurve) -> EllipticCurve {
        let x3 = self.x3;
        let x3_sq = x3.square();
        let six = Fp2::constant(6);
        let aa = (domain.a() * x3 - six * x3_sq + six) * x3;
        let bb = domain.b() * x3_sq;
        EllipticCurve::new(aa, bb)
    }

    /// xx = x·(x·x3 - 1)²/(x - x3)²,
    /// yy = y·(x·x3 - 1)·(x²·x3 - 3x·x3² + x + x3)/(x - x3)³
    fn evaluate(&self, point: &AffinePoint) -> AffinePoint {
        let x3 = self.x3;
        let (x, y) = (point.x(), point.y());
        if point.is_infinity() || x == x3 {
            return AffinePoint::infinity();
        }

        let x_x3_sq = x * x3.square();
        let cubic = x.square() * x3 - (x_x3_sq.double() + x_x3_sq) + x + x3;
        let shifted = x * x3 - Fp2::ONE;

        let inv = (x - x3).invert();
        let inv_sq = inv.square();

        let xx = x * shifted.square() * inv_sq;
        let yy = y * shifted * cubic * inv_sq * inv;
        AffinePoint::new(xx, yy)
    }
}

impl FourIsogeny {
    /// 2x·x4 - x4² - 1, which vanishes at the order-2 kernel point [2]K
    fn half_point_factor(&self, x: &Fp2) -> Fp2 {
        (*x * self.x4).double() - self.x4.square() - Fp2::ONE
    }
}

impl Isogeny for FourIsogeny {
    const DEGREE: u32 = 4;

    fn from_kernel(kernel: &AffinePoint) -> Self {
        Self { x4: kernel.x() }
    }

    /// aa = 4·x4⁴ - 2, bb = -(x4³ + x4)·b/2
    fn codomain(&self, domain: &EllipticCurve) -> EllipticCurve {
        let x4 = self.x4;
        let x4_sq = x4.square();
        let aa = x4_sq.square().double().double() - Fp2::constant(2);
        let minus_half = -Fp2::constant(2).invert();
        let bb = minus_half * (x4_sq * x4 + x4) * domain.b();
        EllipticCurve::new(aa, bb)
    }

    /// xx = -(x·x4² + x - 2x4)·x·(x·x4 - 1)² / ((x - x4)²·(2x·x4 - x4² - 1)),
    /// yy = -2y·x4²·(x·x4 - 1)·q(x) / ((x - x4)³·(2x·x4 - x4² - 1)²)
    ///
    /// where q(x) = x⁴·x4² - 4x³·x4³ + 2x²·x4⁴ + x⁴ - 4x³·x4 + 10x²·x4²
    /// - 4x·x4³ - 4x·x4 + x4² + 1.
    fn evaluate(&self, point: &AffinePoint) -> AffinePoint {
        let x4 = self.x4;
        let (x, y) = (point.x(), point.y());
        let half_point = self.half_point_factor(&x);
        if point.is_infinity() || x == x4 || half_point.is_zero() {
            return AffinePoint::infinity();
        }

        let x_sq = x.square();
        let x_cu = x_sq * x;
        let x_4th = x_sq.square();
        let x4_sq = x4.square();
        let x4_cu = x4_sq * x4;
        let x4_4th = x4_sq.square();
        let four = Fp2::constant(4);

        let quartic = x_4th * x4_sq - four * x_cu * x4_cu + (x_sq * x4_4th).double() + x_4th
            - four * x_cu * x4
            + Fp2::constant(10) * x_sq * x4_sq
            - four * x * x4_cu
            - four * x * x4
            + x4_sq
            + Fp2::ONE;
        let shifted = x * x4 - Fp2::ONE;
        let difference = x - x4;

        let y_numerator = -(y * x4_sq * shifted * quartic).double();
        let y_denominator = difference.square() * difference * half_point.square();
        let yy = y_numerator * y_denominator.invert();

        let x_numerator = -(x * x4_sq + x - x4.double()) * x * shifted.square();
        let x_denominator = difference.square() * half_point;
        let xx = x_numerator * x_denominator.invert();

        AffinePoint::new(xx, yy)
    }
}
