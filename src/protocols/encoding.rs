// src/protocols/encoding.rs
//! Fixed-width octet encoding of public keys.
//! A field element is 4 big-endian bytes, an Fp² element is x0 ‖ x1, and a
//! public key is xP ‖ xQ ‖ xR. Decoding accepts only canonical encodings.

use crate::arithmetic::fp::{Fp, FP_ENCODED_LEN};
use crate::arithmetic::fp2::{Fp2, FP2_ENCODED_LEN};
use crate::errors::SidhError;
use crate::protocols::key_exchange::PublicKey;

/// Number of bytes in an encoded public key
pub const PUBLIC_KEY_ENCODED_LEN: usize = 3 * FP2_ENCODED_LEN;

/// Decode the Fp² element starting at `offset`
fn decode_fp2_at(bytes: &[u8], offset: usize, context: &'static str) -> Result<Fp2, SidhError> {
    let x0 = decode_fp_at(bytes, offset, context)?;
    let x1 = decode_fp_at(bytes, offset + FP_ENCODED_LEN, context)?;
    Ok(Fp2::new(x0, x1))
}

fn decode_fp_at(bytes: &[u8], offset: usize, context: &'static str) -> Result<Fp, SidhError> {
    let mut word = [0u8; FP_ENCODED_LEN];
    word.copy_from_slice(&bytes[offset..offset + FP_ENCODED_LEN]);
    Fp::from_bytes(&word).ok_or(SidhError::InvalidEncoding { context, offset })
}

/// Decode a standalone Fp² element
pub fn decode_fp2(bytes: &[u8]) -> Result<Fp2, SidhError> {
    if bytes.len() != FP2_ENCODED_LEN {
        return Err(SidhError::InvalidKeyLength {
            expected: FP2_ENCODED_LEN,
            actual: bytes.len(),
            context: "field element",
        });
    }
    decode_fp2_at(bytes, 0, "field element")
}

impl PublicKey {
    /// Encode as xP ‖ xQ ‖ xR
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_ENCODED_LEN] {
        let mut bytes = [0u8; PUBLIC_KEY_ENCODED_LEN];
        for (chunk, coordinate) in bytes
            .chunks_exact_mut(FP2_ENCODED_LEN)
            .zip([self.xp(), self.xq(), self.xr()])
        {
            chunk.copy_from_slice(&coordinate.to_bytes());
        }
        bytes
    }

    /// Decode xP ‖ xQ ‖ xR, rejecting wrong lengths and values not below p
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SidhError> {
        if bytes.len() != PUBLIC_KEY_ENCODED_LEN {
            return Err(SidhError::InvalidKeyLength {
                expected: PUBLIC_KEY_ENCODED_LEN,
                actual: bytes.len(),
                context: "public key",
            });
        }

        let xp = decode_fp2_at(bytes, 0, "public key")?;
        let xq = decode_fp2_at(bytes, FP2_ENCODED_LEN, "public key")?;
        let xr = decode_fp2_at(bytes, 2 * FP2_ENCODED_LEN, "public key")?;
        Ok(Self::new(xp, xq, xr))
    }
}
