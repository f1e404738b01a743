// tests/integration/key_exchange.rs
//! Integration tests for the key exchange: the complete workflow from private
//! scalars to the shared j-invariant, through the public API, the wire format
//! and the command-line entry point.

use proptest::prelude::*;
use std::process::Command;
use std::sync::Arc;
use std::thread;

use microsidh::{
    arithmetic::Fp2,
    errors::SidhError,
    params::SidhParams,
    protocols::{
        isoex_2, isoex_3, isogen_2, isogen_3, KeyExchange, PrivateKey2, PrivateKey3, PublicKey,
        PUBLIC_KEY_ENCODED_LEN,
    },
};

/// Test fixture for key exchange operations
struct KeyExchangeFixture {
    params: &'static SidhParams,
    protocol: KeyExchange,
}

impl KeyExchangeFixture {
    fn new() -> Self {
        let params = SidhParams::global().expect("built-in parameters must be valid");
        let protocol = KeyExchange::new(Arc::new(params.clone()));
        Self { params, protocol }
    }

    /// Run both sides for fixed scalars and return the two shared j-invariants
    fn exchange(&self, sk_a: u32, sk_b: u32) -> (Fp2, Fp2) {
        let pk_b = isogen_3(self.params, sk_b).expect("3-side key generation");
        let secret_a = isoex_2(self.params, &pk_b, sk_a).expect("2-side exchange");

        let pk_a = isogen_2(self.params, sk_a).expect("2-side key generation");
        let secret_b = isoex_3(self.params, &pk_a, sk_b).expect("3-side exchange");

        (secret_a, secret_b)
    }
}

#[test]
fn test_known_answer_exchanges() {
    let fixture = KeyExchangeFixture::new();
    let vectors = [
        (3, 7, (0x0881_69ea, 0x03d1_0d90)),
        (0, 7, (0x0b63_03d9, 0x0034_9cf8)),
        (32_767, 4_095, (0x090d_6805, 0x09f6_6003)),
        (1, 1, (0x080e_68b9, 0x07c4_3dbf)),
        (12_345, 999, (0x022f_c0aa, 0x0399_7158)),
    ];

    for (sk_a, sk_b, (x0, x1)) in vectors {
        let (secret_a, secret_b) = fixture.exchange(sk_a, sk_b);
        assert_eq!(secret_a, secret_b, "secrets differ for skA = {}, skB = {}", sk_a, sk_b);
        assert!(secret_a.is_constant(x0, x1), "unexpected j-invariant {} for skA = {}, skB = {}", secret_a, sk_a, sk_b);
    }
}

#[test]
fn test_full_key_exchange_workflow() -> Result<(), SidhError> {
    let fixture = KeyExchangeFixture::new();
    let protocol = &fixture.protocol;

    let alice_private = protocol.generate_private_key_2()?;
    let alice_public = protocol.generate_public_key_2(&alice_private)?;
    let bob_private = protocol.generate_private_key_3()?;
    let bob_public = protocol.generate_public_key_3(&bob_private)?;

    // Public keys travel as bytes
    let alice_wire = alice_public.to_bytes();
    let bob_wire = bob_public.to_bytes();
    assert_eq!(alice_wire.len(), PUBLIC_KEY_ENCODED_LEN);

    let alice_shared = protocol.compute_shared_secret_2(&alice_private, &PublicKey::from_bytes(&bob_wire)?)?;
    let bob_shared = protocol.compute_shared_secret_3(&bob_private, &PublicKey::from_bytes(&alice_wire)?)?;

    assert_eq!(alice_shared.j_invariant, bob_shared.j_invariant);
    assert_eq!(alice_shared.derived_key, bob_shared.derived_key, "derived keys must be identical");
    Ok(())
}

#[test]
fn test_different_partners_give_different_secrets() -> Result<(), SidhError> {
    let fixture = KeyExchangeFixture::new();
    let params = fixture.params;

    let alice = PrivateKey2::new(3, params)?;
    let bob = PrivateKey3::new(7, params)?;
    let carol = PrivateKey3::new(8, params)?;

    let with_bob = fixture
        .protocol
        .compute_shared_secret_2(&alice, &fixture.protocol.generate_public_key_3(&bob)?)?;
    let with_carol = fixture
        .protocol
        .compute_shared_secret_2(&alice, &fixture.protocol.generate_public_key_3(&carol)?)?;

    assert_ne!(with_bob.j_invariant, with_carol.j_invariant);
    assert_ne!(with_bob.derived_key, with_carol.derived_key);
    Ok(())
}

#[test]
fn test_malformed_public_keys_are_rejected() -> Result<(), SidhError> {
    let fixture = KeyExchangeFixture::new();
    let mut wire = isogen_2(fixture.params, 3)?.to_bytes();

    assert!(matches!(
        PublicKey::from_bytes(&wire[..20]),
        Err(SidhError::InvalidKeyLength { expected: 24, actual: 20, .. })
    ));

    wire[16..20].copy_from_slice(&[0xff; 4]);
    let err = PublicKey::from_bytes(&wire).expect_err("component above p must be rejected");
    assert_eq!(err, SidhError::InvalidEncoding { context: "public key", offset: 16 });
    Ok(())
}

#[test]
fn test_out_of_range_scalars_are_rejected() {
    let fixture = KeyExchangeFixture::new();
    let params = fixture.params;

    assert!(matches!(
        isogen_2(params, 32_768),
        Err(SidhError::InvalidScalarRange { side: 2, .. })
    ));
    assert!(matches!(
        isogen_3(params, 6_560),
        Err(SidhError::InvalidScalarRange { side: 3, .. })
    ));
    assert!(PrivateKey3::new(4_096, params).is_err());
}

#[test]
fn test_parameters_are_exposed_read_only() {
    let params = KeyExchangeFixture::new().params;
    let curve = params.starting_curve();
    let (p2, q2) = params.basis_2();
    let (p3, q3) = params.basis_3();

    assert_eq!((params.e2(), params.e3()), (15, 8));
    assert_eq!((params.msb_a(), params.msb_b()), (15, 12));
    for point in [p2, q2, p3, q3] {
        assert!(curve.is_on_curve(&point));
    }
    assert!(curve.double_point_times(&p2, params.e2()).is_infinity());
    assert!(curve.triple_point_times(&q3, params.e3()).is_infinity());
}

#[test]
fn test_parameters_shared_across_threads() {
    let fixture = KeyExchangeFixture::new();
    let protocol = fixture.protocol.clone();

    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let protocol = protocol.clone();
            thread::spawn(move || {
                let params = protocol.params();
                let pk = isogen_3(params, 100 + i).expect("3-side key generation");
                (pk, isogen_3(params, 100 + i).expect("3-side key generation"))
            })
        })
        .collect();

    for handle in handles {
        let (first, second) = handle.join().expect("worker thread panicked");
        assert_eq!(first, second, "key generation must be deterministic");
    }
}

#[test]
fn test_command_line_exchange() {
    let output = Command::new(env!("CARGO_BIN_EXE_microsidh"))
        .args(["3", "7"])
        .output()
        .expect("binary should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "{x0 = 0x088169ea, x1 = 0x03d10d90}",
            "{x0 = 0x088169ea, x1 = 0x03d10d90}",
        ]
    );
}

#[test]
fn test_command_line_rejects_bad_input() {
    for args in [vec!["3"], vec!["abc", "7"], vec!["3", "5000"], vec!["40000", "7"]] {
        let output = Command::new(env!("CARGO_BIN_EXE_microsidh"))
            .args(&args)
            .output()
            .expect("binary should run");
        assert_eq!(output.status.code(), Some(1), "arguments {:?} must be rejected", args);
        assert!(output.stdout.is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn test_exchange_agrees_through_the_wire(sk_a in 0u32..(1 << 15), sk_b in 0u32..(1 << 12)) {
        let fixture = KeyExchangeFixture::new();
        let params = fixture.params;

        let pk_a = PublicKey::from_bytes(&isogen_2(params, sk_a).expect("2-side key generation").to_bytes())
            .expect("own encoding must decode");
        let pk_b = PublicKey::from_bytes(&isogen_3(params, sk_b).expect("3-side key generation").to_bytes())
            .expect("own encoding must decode");

        prop_assert_eq!(
            isoex_2(params, &pk_b, sk_a).expect("2-side exchange"),
            isoex_3(params, &pk_a, sk_b).expect("3-side exchange")
        );
    }
}
