// src/curves/isogeny_chain.rs
//! Iterated isogeny walks of degree 2^e and 3^e.
//! A kernel point S of order ℓ^e is consumed one small isogeny at a time: each
//! step takes the point of order ℓ (or 4) inside the current kernel, moves to
//! the image curve, and pushes S along. Up to two auxiliary points ride along
//! so that the caller can publish their images.

use log::trace;

use crate::curves::elliptic_curve::{AffinePoint, EllipticCurve};
use crate::curves::isogeny::{FourIsogeny, Isogeny, ThreeIsogeny, TwoIsogeny};

/// State of an isogeny walk: the current curve and the images of the kernel
/// and auxiliary points on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsogenyWalk {
    pub curve: EllipticCurve,
    pub kernel: AffinePoint,
    pub auxiliary: [Option<AffinePoint>; 2],
}

impl IsogenyWalk {
    fn new(curve: &EllipticCurve, kernel: &AffinePoint, auxiliary: [Option<AffinePoint>; 2]) -> Self {
        Self {
            curve: *curve,
            kernel: *kernel,
            auxiliary,
        }
    }

    /// Apply the isogeny generated by `generator`, a point of the current
    /// kernel of order `I::DEGREE`
    fn step<I: Isogeny>(&mut self, generator: &AffinePoint) {
        let phi = I::from_kernel(generator);
        self.curve = phi.codomain(&self.curve);
        self.kernel = phi.evaluate(&self.kernel);
        for point in self.auxiliary.iter_mut().flatten() {
            *point = phi.evaluate(point);
        }
        trace!("degree-{} step, image curve {}", I::DEGREE, self.curve);
    }
}

/// Walk the isogeny of degree 2^e with kernel generated by `kernel`.
///
/// An odd exponent starts with one degree-2 step at [2^(e-1)]S; the rest is
/// covered by degree-4 steps at [2^i]S for i = e-2, e-4, ..., 0, each computed
/// on the current curve from the current image of S.
pub fn iso_2_e(
    e: u32,
    curve: &EllipticCurve,
    kernel: &AffinePoint,
    auxiliary: [Option<AffinePoint>; 2],
) -> IsogenyWalk {
    let mut walk = IsogenyWalk::new(curve, kernel, auxiliary);
    let mut remaining = e;

    if remaining % 2 == 1 {
        remaining -= 1;
        let generator = walk.curve.double_point_times(&walk.kernel, remaining);
        walk.step::<TwoIsogeny>(&generator);
    }

    while remaining >= 2 {
        remaining -= 2;
        let generator = walk.curve.double_point_times(&walk.kernel, remaining);
        walk.step::<FourIsogeny>(&generator);
    }

    walk
}

/// Walk the isogeny of degree 3^e with kernel generated by `kernel`, as
/// degree-3 steps at [3^i]S for i = e-1, ..., 0.
pub fn iso_3_e(
    e: u32,
    curve: &EllipticCurve,
    kernel: &AffinePoint,
    auxiliary: [Option<AffinePoint>; 2],
) -> IsogenyWalk {
    let mut walk = IsogenyWalk::new(curve, kernel, auxiliary);

    for i in (0..e).rev() {
        let generator = walk.curve.triple_point_times(&walk.kernel, i);
        walk.step::<ThreeIsogeny>(&generator);
    }

    walk
}
