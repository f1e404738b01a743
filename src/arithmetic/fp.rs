// src/arithmetic/fp.rs
//! Prime field arithmetic over Fp for the 28-bit demonstration prime.
//! Elements are single-word values reduced into [0, p) after every operation.
//! Products are accumulated in 64 bits before reduction, so no intermediate
//! value can overflow. None of the operations here are constant time.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::params::MODULUS;

/// Exponent (p + 1) / 4 used by the square root; valid because p ≡ 3 mod 4.
pub(crate) const SQRT_EXPONENT: u32 = (MODULUS + 1) >> 2;

/// Exponent (p - 3) / 4, the companion of [`SQRT_EXPONENT`] used by the Fp² square root.
pub(crate) const SQRT_EXPONENT_COMPANION: u32 = (MODULUS - 3) >> 2;

/// Number of bytes in the fixed-width encoding of an element
pub const FP_ENCODED_LEN: usize = 4;

/// Element of the prime field Fp
#[derive(Clone, Copy, Debug, Default)]
pub struct Fp {
    value: u32,
}

impl Fp {
    /// The additive identity
    pub const ZERO: Fp = Fp { value: 0 };

    /// The multiplicative identity
    pub const ONE: Fp = Fp { value: 1 };

    /// Create a field element from an integer constant, reducing it modulo p
    pub const fn new(value: u32) -> Self {
        Self {
            value: value % MODULUS,
        }
    }

    /// Canonical representative in [0, p)
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Check if element is zero
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Check whether the canonical representative is even
    pub fn is_even(&self) -> bool {
        !self.is_bit_set(0)
    }

    /// Returns bit `index` of the canonical representative.
    ///
    /// Indices at or beyond the word width read as unset. Scalar
    /// multiplication ladders are driven by this test.
    pub fn is_bit_set(&self, index: u32) -> bool {
        index < u32::BITS && (self.value >> index) & 1 == 1
    }

    /// Compare against an integer constant, reducing the constant first
    pub fn is_constant(&self, constant: u32) -> bool {
        self.value == constant % MODULUS
    }

    /// Squaring, a·a mod p
    pub fn square(&self) -> Self {
        *self * *self
    }

    /// Modular exponentiation a^e mod p
    ///
    /// Square-and-multiply over a fixed 32-bit scan of the exponent, most
    /// significant bit first. The loop count never depends on the exponent.
    pub fn pow(&self, exponent: u32) -> Self {
        let mut result = Fp::ONE;
        for i in (0..u32::BITS).rev() {
            result = result.square();
            if (exponent >> i) & 1 == 1 {
                result = result * *self;
            }
        }
        result
    }

    /// Multiplicative inverse a^(p-2) mod p (Fermat's little theorem).
    ///
    /// The inverse of zero is zero. This is a degenerate value, not an
    /// error, and callers dividing by something that may vanish must handle
    /// it themselves.
    pub fn invert(&self) -> Self {
        self.pow(MODULUS - 2)
    }

    /// Square root with canonical (even) parity.
    ///
    /// Computes t = a^((p+1)/4) and returns t when it is even, -t otherwise.
    /// The result is only meaningful for quadratic residues: for a
    /// non-residue it returns a deterministic value whose square is -a.
    /// Use [`Fp::is_quadratic_residue`] first when the input is untrusted.
    pub fn sqrt(&self) -> Self {
        let root = self.pow(SQRT_EXPONENT);
        if root.is_even() {
            root
        } else {
            -root
        }
    }

    /// Quadratic residue test: true iff sqrt(a)² == a
    pub fn is_quadratic_residue(&self) -> bool {
        self.sqrt().square() == *self
    }

    /// Convert to the 4-byte big-endian representation
    pub fn to_bytes(&self) -> [u8; FP_ENCODED_LEN] {
        self.value.to_be_bytes()
    }

    /// Parse the 4-byte big-endian representation.
    ///
    /// Returns `None` for non-canonical encodings (values not below p).
    pub fn from_bytes(bytes: &[u8; FP_ENCODED_LEN]) -> Option<Self> {
        let value = u32::from_be_bytes(*bytes);
        if value < MODULUS {
            Some(Self { value })
        } else {
            None
        }
    }
}

impl ConstantTimeEq for Fp {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.value.ct_eq(&other.value)
    }
}

impl Zeroize for Fp {
    fn zeroize(&mut self) {
        self.value.zeroize();
    }
}

impl PartialEq for Fp {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Fp {}

impl fmt::Display for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.value)
    }
}

impl Add for Fp {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        // both operands are below p < 2^28, so the sum cannot wrap
        let sum = self.value + other.value;
        Fp {
            value: if sum >= MODULUS { sum - MODULUS } else { sum },
        }
    }
}

impl Sub for Fp {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self + (-other)
    }
}

impl Mul for Fp {
    type Output = Self;

    fn mul(self, other: Self) -> Self::Output {
        let product = (self.value as u64 * other.value as u64) % MODULUS as u64;
        Fp {
            value: product as u32,
        }
    }
}

impl Neg for Fp {
    type Output = Self;

    fn neg(self) -> Self::Output {
        // -a mod p = p - a (if a != 0)
        if self.is_zero() {
            self
        } else {
            Fp {
                value: MODULUS - self.value,
            }
        }
    }
}
