// src/arithmetic/fp2.rs
//! Quadratic extension field Fp² = Fp[i]/(i² + 1).
//! Elements are pairs (x0, x1) standing for x0 + x1·i. Multiplication uses the
//! three-multiplication Karatsuba identity, inversion goes through the norm,
//! and the square root reproduces the reference branch selection exactly so
//! that both parties of an exchange resolve the sign ambiguity the same way.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::arithmetic::fp::{Fp, FP_ENCODED_LEN, SQRT_EXPONENT, SQRT_EXPONENT_COMPANION};

/// Number of bytes in the fixed-width encoding of an Fp² element
pub const FP2_ENCODED_LEN: usize = 2 * FP_ENCODED_LEN;

/// Element of the quadratic extension field Fp²: x0 + x1·i, where i² = -1
#[derive(Clone, Copy, Debug, Default)]
pub struct Fp2 {
    x0: Fp,
    x1: Fp,
}

/// Which case of the square root algorithm produced a root.
///
/// The three cases are algebraic case splits rather than failures; they are
/// exposed so that callers and tests can see which branch resolved the
/// two-fold root ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqrtBranch {
    /// x1 = 0 and x0 is a non-residue in Fp: the root is purely imaginary
    Imaginary,
    /// The candidate real part t1 = t0^((p+1)/4) squared back to t0
    Direct,
    /// The candidate failed and the components were rotated to (t2, -t1)
    Rotated,
}

impl Fp2 {
    /// The zero element of Fp²
    pub const ZERO: Fp2 = Fp2 {
        x0: Fp::ZERO,
        x1: Fp::ZERO,
    };

    /// The one element of Fp²
    pub const ONE: Fp2 = Fp2 {
        x0: Fp::ONE,
        x1: Fp::ZERO,
    };

    /// Create a new Fp² element from its two components
    pub const fn new(x0: Fp, x1: Fp) -> Self {
        Self { x0, x1 }
    }

    /// Create an element from a pair of integer constants, each reduced modulo p
    pub const fn from_u32s(x0: u32, x1: u32) -> Self {
        Self {
            x0: Fp::new(x0),
            x1: Fp::new(x1),
        }
    }

    /// Embed a base field constant as (c, 0)
    pub const fn constant(c: u32) -> Self {
        Self::from_u32s(c, 0)
    }

    /// Real component x0
    pub fn x0(&self) -> Fp {
        self.x0
    }

    /// Imaginary component x1
    pub fn x1(&self) -> Fp {
        self.x1
    }

    /// Get the real and imaginary components
    pub fn components(&self) -> (Fp, Fp) {
        (self.x0, self.x1)
    }

    /// Check if the element is zero
    pub fn is_zero(&self) -> bool {
        self.x0.is_zero() && self.x1.is_zero()
    }

    /// Compare both components against integer constants
    pub fn is_constant(&self, x0: u32, x1: u32) -> bool {
        self.x0.is_constant(x0) && self.x1.is_constant(x1)
    }

    /// 2·a
    pub fn double(&self) -> Self {
        *self + *self
    }

    pub fn square(&self) -> Self {
        *self * *self
    }

    /// Field norm: N(x0 + x1·i) = x0² + x1²
    ///
    /// The norm maps Fp² to Fp and is multiplicative: N(xy) = N(x)N(y).
    pub fn norm(&self) -> Fp {
        self.x0.square() + self.x1.square()
    }

    /// Inversion through the norm: (x0 + x1·i)⁻¹ = (x0 - x1·i)/(x0² + x1²)
    ///
    /// Like the base field, zero inverts to zero.
    pub fn invert(&self) -> Self {
        let norm_inv = self.norm().invert();
        Self {
            x0: self.x0 * norm_inv,
            x1: -self.x1 * norm_inv,
        }
    }

    /// Square root with canonical parity of the real component.
    ///
    /// See [`Fp2::sqrt_with_branch`] for the algorithm. As in the base field
    /// the result is only meaningful for squares.
    pub fn sqrt(&self) -> Self {
        self.sqrt_with_branch().0
    }

    /// Square root, also reporting which branch of the algorithm was taken.
    ///
    /// When x1 = 0 and x0 is a non-residue in Fp the root is (0, sqrt(x0)).
    /// Otherwise, with α = (x0² + x1²)^((p+1)/4):
    /// t0 = (x0 + α)/2, t1 = t0^((p+1)/4), t2 = t0^((p-3)/4)·x1/2.
    /// If t1² ≠ t0 the pair becomes (t2, -t1). Finally both components are
    /// negated when the real part is odd.
    pub fn sqrt_with_branch(&self) -> (Self, SqrtBranch) {
        if self.x1.is_zero() && !self.x0.is_quadratic_residue() {
            let root = Self {
                x0: Fp::ZERO,
                x1: self.x0.sqrt(),
            };
            return (root, SqrtBranch::Imaginary);
        }

        let half = Fp::new(2).invert();
        let alpha = self.norm().pow(SQRT_EXPONENT);
        let t0 = (self.x0 + alpha) * half;
        let t1 = t0.pow(SQRT_EXPONENT);
        let t2 = t0.pow(SQRT_EXPONENT_COMPANION) * self.x1 * half;

        let (real, imag, branch) = if t1.square() == t0 {
            (t1, t2, SqrtBranch::Direct)
        } else {
            (t2, -t1, SqrtBranch::Rotated)
        };

        let root = if real.is_even() {
            Self { x0: real, x1: imag }
        } else {
            Self {
                x0: -real,
                x1: -imag,
            }
        };
        (root, branch)
    }

    /// Convert to the 8-byte representation x0 ‖ x1
    pub fn to_bytes(&self) -> [u8; FP2_ENCODED_LEN] {
        let mut bytes = [0u8; FP2_ENCODED_LEN];
        bytes[..FP_ENCODED_LEN].copy_from_slice(&self.x0.to_bytes());
        bytes[FP_ENCODED_LEN..].copy_from_slice(&self.x1.to_bytes());
        bytes
    }

    /// Parse the 8-byte representation; `None` if either half is not below p
    pub fn from_bytes(bytes: &[u8; FP2_ENCODED_LEN]) -> Option<Self> {
        let mut half = [0u8; FP_ENCODED_LEN];
        half.copy_from_slice(&bytes[..FP_ENCODED_LEN]);
        let x0 = Fp::from_bytes(&half)?;
        half.copy_from_slice(&bytes[FP_ENCODED_LEN..]);
        let x1 = Fp::from_bytes(&half)?;
        Some(Self { x0, x1 })
    }
}

impl ConstantTimeEq for Fp2 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x0.ct_eq(&other.x0) & self.x1.ct_eq(&other.x1)
    }
}

impl Zeroize for Fp2 {
    fn zeroize(&mut self) {
        self.x0.zeroize();
        self.x1.zeroize();
    }
}

impl PartialEq for Fp2 {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Fp2 {}

impl fmt::Display for Fp2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{x0 = {}, x1 = {}}}", self.x0, self.x1)
    }
}

impl Add for Fp2 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            x0: self.x0 + other.x0,
            x1: self.x1 + other.x1,
        }
    }
}

impl Sub for Fp2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self {
            x0: self.x0 - other.x0,
            x1: self.x1 - other.x1,
        }
    }
}

impl Mul for Fp2 {
    type Output = Self;

    /// (a0 + a1·i)(b0 + b1·i) = (a0·b0 - a1·b1) + ((a0 + a1)(b0 + b1) - a0·b0 - a1·b1)·i
    fn mul(self, other: Self) -> Self::Output {
        let mul0 = self.x0 * other.x0;
        let mul1 = self.x1 * other.x1;
        let cross = (self.x0 + self.x1) * (other.x0 + other.x1);
        Self {
            x0: mul0 - mul1,
            x1: cross - (mul0 + mul1),
        }
    }
}

impl Neg for Fp2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x0: -self.x0,
            x1: -self.x1,
        }
    }
}
