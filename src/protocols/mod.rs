// src/protocols/mod.rs
//! The key exchange protocol and its wire encoding.

pub mod encoding;
pub mod key_exchange;

pub use encoding::{decode_fp2, PUBLIC_KEY_ENCODED_LEN};
pub use key_exchange::{
    derive_key_from_j_invariant, get_xr, isoex_2, isoex_3, isogen_2, isogen_3, recover_curve,
    KeyExchange, PrivateKey2, PrivateKey3, PublicKey, SharedSecret, DERIVED_KEY_LEN,
};
