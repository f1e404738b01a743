// src/lib.rs
//! Supersingular isogeny Diffie-Hellman over the 28-bit prime p = 2^15·3^8 - 1.
//!
//! The parameters are far too small to offer any security; the crate exists to
//! make every step of the exchange observable. Two parties agree on a shared
//! j-invariant:
//!
//! ```
//! use microsidh::params::SidhParams;
//! use microsidh::protocols::{isoex_2, isoex_3, isogen_2, isogen_3};
//!
//! let params = SidhParams::global()?;
//! let (sk_a, sk_b) = (3, 7);
//!
//! let pk_a = isogen_2(params, sk_a)?;
//! let pk_b = isogen_3(params, sk_b)?;
//! assert_eq!(isoex_2(params, &pk_b, sk_a)?, isoex_3(params, &pk_a, sk_b)?);
//! # Ok::<(), microsidh::errors::SidhError>(())
//! ```

pub mod arithmetic;
pub mod curves;
pub mod errors;
pub mod params;
pub mod protocols;

pub use errors::{ErrorSeverity, SidhError};
pub use params::SidhParams;
