// src/arithmetic/mod.rs
//! Finite field arithmetic: the prime field Fp and its quadratic extension Fp².

pub mod fp;
pub mod fp2;

pub use fp::Fp;
pub use fp2::{Fp2, SqrtBranch};
