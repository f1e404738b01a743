// src/curves/mod.rs
//! Montgomery curve arithmetic and the isogenies used to walk between curves.

pub mod elliptic_curve;
pub mod isogeny;
pub mod isogeny_chain;

pub use elliptic_curve::{AdditionCase, AffinePoint, EllipticCurve};
pub use isogeny::{FourIsogeny, Isogeny, ThreeIsogeny, TwoIsogeny};
pub use isogeny_chain::{iso_2_e, iso_3_e, IsogenyWalk};
