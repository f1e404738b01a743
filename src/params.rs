// src/params.rs
//! Public parameters of the exchange over p = 2^15·3^8 - 1 = 0x0cd07fff.
//! The raw constant table is turned into a validated, immutable [`SidhParams`]
//! value once; it can then be shared freely between threads, either through
//! an `Arc` or the lazily initialised [`SidhParams::global`] instance.

use std::sync::OnceLock;
use thiserror::Error;

use crate::arithmetic::fp2::Fp2;
use crate::curves::elliptic_curve::{AffinePoint, EllipticCurve};

/// The field characteristic p = 2^15·3^8 - 1
pub const MODULUS: u32 = 0x0cd0_7fff;

/// Error types for parameter validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamsError {
    #[error("Modulus mismatch: table declares {actual:#010x}, field is built for {expected:#010x}")]
    ModulusMismatch { expected: u32, actual: u32 },

    #[error("Modulus {modulus:#010x} is not 2^{e2}·3^{e3} - 1")]
    InvalidModulusShape { modulus: u32, e2: u32, e3: u32 },

    #[error("Modulus {modulus:#010x} is not congruent to 3 mod 4")]
    ModulusNotThreeModFour { modulus: u32 },

    #[error("Ladder width for the {side}-side is {width} bits, exceeding the subgroup order {order}")]
    LadderTooWide { side: u32, width: u32, order: u64 },

    #[error("Starting curve is singular")]
    SingularCurve,

    #[error("Base point {name} does not lie on the starting curve")]
    BasePointNotOnCurve { name: &'static str },

    #[error("Base point {name} does not have exact order {order}")]
    InvalidBasePointOrder { name: &'static str, order: u64 },
}

/// Affine coordinates of a base point as integer pairs (x0, x1)
#[derive(Debug, Clone, Copy)]
pub struct RawPoint {
    pub x: (u32, u32),
    pub y: (u32, u32),
}

/// Compiled-in parameter table
#[derive(Debug, Clone, Copy)]
pub struct RawParams {
    pub modulus: u32,
    /// Exponent of 2 in p + 1
    pub e2: u32,
    /// Exponent of 3 in p + 1
    pub e3: u32,
    /// Bit width of the 2-side private scalar ladder
    pub msb_a: u32,
    /// Bit width of the 3-side private scalar ladder
    pub msb_b: u32,
    pub curve_a: (u32, u32),
    pub curve_b: (u32, u32),
    pub p2: RawPoint,
    pub q2: RawPoint,
    pub p3: RawPoint,
    pub q3: RawPoint,
}

/// Built-in parameters: starting curve y² = x³ + 6x² + x with its torsion bases
pub const RAW_PARAMS: RawParams = RawParams {
    modulus: MODULUS,
    e2: 15,
    e3: 8,
    msb_a: 15,
    msb_b: 12,
    curve_a: (6, 0),
    curve_b: (1, 0),
    p2: RawPoint {
        x: (0x0a7e_21eb, 0x09ab_3afb),
        y: (0x0366_529e, 0x0061_5a32),
    },
    q2: RawPoint {
        x: (0x0987_5b2b, 0x076a_3372),
        y: (0x0021_6b6b, 0x0b64_65ec),
    },
    p3: RawPoint {
        x: (0x09aa_9e25, 0),
        y: (0x040d_8353, 0),
    },
    q3: RawPoint {
        x: (0x0b96_ade2, 0),
        y: (0, 0x082a_1f97),
    },
};

impl RawPoint {
    fn to_point(self) -> AffinePoint {
        AffinePoint::new(
            Fp2::from_u32s(self.x.0, self.x.1),
            Fp2::from_u32s(self.y.0, self.y.1),
        )
    }
}

/// Validated public parameters shared by both parties.
///
/// Only [`SidhParams::setup`] builds a value, so every instance outside this
/// crate has passed [`SidhParams::validate`]. Fields are read through the
/// accessors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidhParams {
    pub(crate) e2: u32,
    pub(crate) e3: u32,
    pub(crate) msb_a: u32,
    pub(crate) msb_b: u32,
    pub(crate) starting_curve: EllipticCurve,
    pub(crate) p2: AffinePoint,
    pub(crate) q2: AffinePoint,
    pub(crate) p3: AffinePoint,
    pub(crate) q3: AffinePoint,
}

impl SidhParams {
    /// Build and validate parameters from a raw table
    pub fn setup(raw: &RawParams) -> Result<Self, ParamsError> {
        if raw.modulus != MODULUS {
            return Err(ParamsError::ModulusMismatch {
                expected: MODULUS,
                actual: raw.modulus,
            });
        }

        let params = Self {
            e2: raw.e2,
            e3: raw.e3,
            msb_a: raw.msb_a,
            msb_b: raw.msb_b,
            starting_curve: EllipticCurve::new(
                Fp2::from_u32s(raw.curve_a.0, raw.curve_a.1),
                Fp2::from_u32s(raw.curve_b.0, raw.curve_b.1),
            ),
            p2: raw.p2.to_point(),
            q2: raw.q2.to_point(),
            p3: raw.p3.to_point(),
            q3: raw.q3.to_point(),
        };
        params.validate()?;

        log::debug!(
            "SIDH parameters ready: p = {:#010x}, e2 = {}, e3 = {}",
            MODULUS,
            params.e2,
            params.e3
        );
        Ok(params)
    }

    /// Global instance of the built-in parameters (lazy initialization)
    ///
    /// The outcome of the first validation is cached, so a broken table
    /// reports the same error on every call.
    pub fn global() -> Result<&'static Self, ParamsError> {
        static INSTANCE: OnceLock<Result<SidhParams, ParamsError>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| Self::setup(&RAW_PARAMS))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// 2-side walk length (degree 2^e2)
    pub fn e2(&self) -> u32 {
        self.e2
    }

    /// 3-side walk length (degree 3^e3)
    pub fn e3(&self) -> u32 {
        self.e3
    }

    /// Bit width of the 2-side scalar ladder
    pub fn msb_a(&self) -> u32 {
        self.msb_a
    }

    /// Bit width of the 3-side scalar ladder
    pub fn msb_b(&self) -> u32 {
        self.msb_b
    }

    pub fn starting_curve(&self) -> EllipticCurve {
        self.starting_curve
    }

    /// Basis (P2, Q2) of the 2^e2-torsion
    pub fn basis_2(&self) -> (AffinePoint, AffinePoint) {
        (self.p2, self.q2)
    }

    /// Basis (P3, Q3) of the 3^e3-torsion
    pub fn basis_3(&self) -> (AffinePoint, AffinePoint) {
        (self.p3, self.q3)
    }

    /// Order of the 2-side torsion subgroup, 2^e2
    pub fn order_2(&self) -> u64 {
        1u64 << self.e2
    }

    /// Order of the 3-side torsion subgroup, 3^e3
    pub fn order_3(&self) -> u64 {
        3u64.pow(self.e3)
    }

    /// Number of distinct 2-side private scalars, 2^msb_a
    pub fn scalar_bound_2(&self) -> u64 {
        1u64 << self.msb_a
    }

    /// Number of distinct 3-side private scalars, 2^msb_b
    pub fn scalar_bound_3(&self) -> u64 {
        1u64 << self.msb_b
    }

    /// Validate parameters against the mathematical constraints of the exchange
    ///
    /// Checks the shape of the modulus, that every scalar representable by a
    /// ladder lies below the subgroup order, that the curve is nonsingular, and
    /// that each base point is on the curve with exactly the expected order.
    pub fn validate(&self) -> Result<(), ParamsError> {
        // Exponents small enough that 2^e2·3^e3 fits the field
        let shape = if self.e2 < 32 && self.e3 < 21 {
            Some((1u64 << self.e2) * 3u64.pow(self.e3))
        } else {
            None
        };
        if shape != Some(u64::from(MODULUS) + 1) {
            return Err(ParamsError::InvalidModulusShape {
                modulus: MODULUS,
                e2: self.e2,
                e3: self.e3,
            });
        }

        if MODULUS % 4 != 3 {
            return Err(ParamsError::ModulusNotThreeModFour { modulus: MODULUS });
        }

        if self.msb_a > self.e2 {
            return Err(ParamsError::LadderTooWide {
                side: 2,
                width: self.msb_a,
                order: self.order_2(),
            });
        }
        if self.msb_b >= 32 || self.scalar_bound_3() > self.order_3() {
            return Err(ParamsError::LadderTooWide {
                side: 3,
                width: self.msb_b,
                order: self.order_3(),
            });
        }

        let curve = &self.starting_curve;
        let a_sq = curve.a().square();
        if curve.b().is_zero() || a_sq == Fp2::constant(4) {
            return Err(ParamsError::SingularCurve);
        }

        let bases = [
            ("P2", self.p2, 2u64),
            ("Q2", self.q2, 2),
            ("P3", self.p3, 3),
            ("Q3", self.q3, 3),
        ];
        for (name, point, prime) in bases {
            if point.is_infinity() || !curve.is_on_curve(&point) {
                return Err(ParamsError::BasePointNotOnCurve { name });
            }

            let (order, almost, full) = if prime == 2 {
                (
                    self.order_2(),
                    curve.double_point_times(&point, self.e2 - 1),
                    curve.double_point_times(&point, self.e2),
                )
            } else {
                (
                    self.order_3(),
                    curve.triple_point_times(&point, self.e3 - 1),
                    curve.triple_point_times(&point, self.e3),
                )
            };
            if almost.is_infinity() || !full.is_infinity() {
                return Err(ParamsError::InvalidBasePointOrder { name, order });
            }
        }

        Ok(())
    }
}
