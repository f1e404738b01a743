// src/protocols/key_exchange.rs
//! Isogeny-based Diffie-Hellman key exchange.
//! The 2-side walks a 2^e2-isogeny and the 3-side a 3^e3-isogeny from the
//! shared starting curve, each publishing the x-coordinates of the other
//! side's torsion basis on its image curve. Applying one's own secret kernel
//! to the partner's curve lands both parties on isomorphic curves, whose
//! common j-invariant is the shared secret.

use hmac::{Hmac, Mac};
use log::debug;
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::arithmetic::{Fp, Fp2};
use crate::curves::{iso_2_e, iso_3_e, AffinePoint, EllipticCurve, IsogenyWalk};
use crate::errors::SidhError;
use crate::params::{SidhParams, MODULUS};

/// Length of the key derived from the shared j-invariant
pub const DERIVED_KEY_LEN: usize = 32;

/// Public key: x-coordinates of the images of the partner's torsion basis P, Q
/// and of their difference R = P - Q
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    xp: Fp2,
    xq: Fp2,
    xr: Fp2,
}

impl PublicKey {
    pub fn new(xp: Fp2, xq: Fp2, xr: Fp2) -> Self {
        Self { xp, xq, xr }
    }

    pub fn xp(&self) -> Fp2 {
        self.xp
    }

    pub fn xq(&self) -> Fp2 {
        self.xq
    }

    pub fn xr(&self) -> Fp2 {
        self.xr
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x} {:08x}, {:08x} {:08x}, {:08x} {:08x}",
            self.xp.x0().value(),
            self.xp.x1().value(),
            self.xq.x0().value(),
            self.xq.x1().value(),
            self.xr.x0().value(),
            self.xr.x1().value()
        )
    }
}

/// Private scalar of the 2-side, below 2^msb_a
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey2 {
    value: u32,
}

/// Private scalar of the 3-side, below 2^msb_b
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey3 {
    value: u32,
}

impl PrivateKey2 {
    /// Wrap a scalar, rejecting values outside the 2-side ladder width
    pub fn new(value: u32, params: &SidhParams) -> Result<Self, SidhError> {
        checked_scalar(value, params.msb_a, 2)?;
        Ok(Self { value })
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl PrivateKey3 {
    /// Wrap a scalar, rejecting values outside the 3-side ladder width
    pub fn new(value: u32, params: &SidhParams) -> Result<Self, SidhError> {
        checked_scalar(value, params.msb_b, 3)?;
        Ok(Self { value })
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl fmt::Debug for PrivateKey2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey2(..)")
    }
}

impl fmt::Debug for PrivateKey3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey3(..)")
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Result of key exchange: the shared j-invariant and the key derived from it
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    /// j-invariant of the common image curve
    pub j_invariant: Fp2,
    /// HMAC-SHA256 of the encoded j-invariant
    pub derived_key: [u8; DERIVED_KEY_LEN],
}

/// Reject scalars that do not fit the ladder and lift the rest into Fp.
///
/// A ladder of 64 bits or more has no representable bound and accepts nothing.
fn checked_scalar(value: u32, width: u32, side: u32) -> Result<Fp, SidhError> {
    let value = u64::from(value);
    match 1u64.checked_shl(width) {
        Some(bound) if value < bound => Ok(Fp::new(value as u32)),
        bound => Err(SidhError::InvalidScalarRange {
            side,
            value,
            bound: bound.unwrap_or(0),
        }),
    }
}

/// Pack the images of a torsion basis into a public key: (x(P), x(Q), x(P - Q))
pub fn get_xr(curve: &EllipticCurve, p: &AffinePoint, q: &AffinePoint) -> PublicKey {
    let r = curve.add_points(p, &q.negate());
    PublicKey::new(p.x(), q.x(), r.x())
}

/// Recover the partner's image curve and torsion basis from a public key.
///
/// The curve coefficient is
/// a = (1 - xP·xQ - xP·xR - xQ·xR)² / (4·xP·xQ·xR) - xP - xQ - xR with b = 1.
/// Both points are lifted with the canonical square root; Q is negated when
/// the lifted pair does not reproduce x(P - Q) = xR.
pub fn recover_curve(pk: &PublicKey) -> (EllipticCurve, AffinePoint, AffinePoint) {
    let (xp, xq, xr) = (pk.xp, pk.xq, pk.xr);

    let numerator = (Fp2::ONE - xp * xq - xp * xr - xq * xr).square();
    let denominator = (xp * xq * xr).double().double();
    let a = numerator * denominator.invert() - xp - xq - xr;
    let curve = EllipticCurve::new(a, Fp2::ONE);

    let p = curve.lift_x(xp);
    let mut q = curve.lift_x(xq);
    if curve.add_points(&p, &q.negate()).x() != xr {
        q = q.negate();
    }
    (curve, p, q)
}

/// Kernel generator P + [k]Q
fn kernel_point(
    curve: &EllipticCurve,
    p: &AffinePoint,
    q: &AffinePoint,
    scalar: &Fp,
    msb: u32,
) -> AffinePoint {
    curve.add_points(p, &curve.scalar_mul(scalar, q, msb))
}

/// Public key from the images of the partner's basis carried by `walk`.
/// An image that was never supplied reads as the point at infinity.
fn publish(walk: &IsogenyWalk) -> PublicKey {
    let [p, q] = walk
        .auxiliary
        .map(|image| image.unwrap_or_else(AffinePoint::infinity));
    get_xr(&walk.curve, &p, &q)
}

/// Public key of the 2-side for the private scalar `sk2`
pub fn isogen_2(params: &SidhParams, sk2: u32) -> Result<PublicKey, SidhError> {
    let scalar = checked_scalar(sk2, params.msb_a, 2)?;
    let curve = &params.starting_curve;

    let kernel = kernel_point(curve, &params.p2, &params.q2, &scalar, params.msb_a);
    let walk = iso_2_e(params.e2, curve, &kernel, [Some(params.p3), Some(params.q3)]);

    let pk = publish(&walk);
    debug!("2-side public key generated: {}", pk);
    Ok(pk)
}

/// Public key of the 3-side for the private scalar `sk3`
pub fn isogen_3(params: &SidhParams, sk3: u32) -> Result<PublicKey, SidhError> {
    let scalar = checked_scalar(sk3, params.msb_b, 3)?;
    let curve = &params.starting_curve;

    let kernel = kernel_point(curve, &params.p3, &params.q3, &scalar, params.msb_b);
    let walk = iso_3_e(params.e3, curve, &kernel, [Some(params.p2), Some(params.q2)]);

    let pk = publish(&walk);
    debug!("3-side public key generated: {}", pk);
    Ok(pk)
}

/// Shared j-invariant computed by the 2-side from the 3-side's public key.
///
/// The peer key is not validated: coordinates that do not describe points on
/// a supersingular curve still produce a j-invariant, just a meaningless one.
pub fn isoex_2(params: &SidhParams, pk: &PublicKey, sk2: u32) -> Result<Fp2, SidhError> {
    let scalar = checked_scalar(sk2, params.msb_a, 2)?;
    let (curve, p, q) = recover_curve(pk);

    let kernel = kernel_point(&curve, &p, &q, &scalar, params.msb_a);
    let walk = iso_2_e(params.e2, &curve, &kernel, [None, None]);

    debug!("2-side reached the shared curve");
    Ok(walk.curve.j_invariant())
}

/// Shared j-invariant computed by the 3-side from the 2-side's public key.
///
/// As with [`isoex_2`], the peer key is used as given.
pub fn isoex_3(params: &SidhParams, pk: &PublicKey, sk3: u32) -> Result<Fp2, SidhError> {
    let scalar = checked_scalar(sk3, params.msb_b, 3)?;
    let (curve, p, q) = recover_curve(pk);

    let kernel = kernel_point(&curve, &p, &q, &scalar, params.msb_b);
    let walk = iso_3_e(params.e3, &curve, &kernel, [None, None]);

    debug!("3-side reached the shared curve");
    Ok(walk.curve.j_invariant())
}

/// Derive a symmetric key from the shared j-invariant with HMAC-SHA256
pub fn derive_key_from_j_invariant(j_inv: &Fp2) -> Result<[u8; DERIVED_KEY_LEN], SidhError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(&j_inv.to_bytes()).map_err(|e| {
        SidhError::KeyDerivationFailed {
            reason: e.to_string(),
        }
    })?;

    // Domain separation
    let info = format!("microsidh-v1-p{:08x}", MODULUS);
    mac.update(info.as_bytes());

    let digest = mac.finalize().into_bytes();
    let mut key = [0u8; DERIVED_KEY_LEN];
    key.copy_from_slice(&digest);
    Ok(key)
}

/// Key exchange protocol object bound to one parameter set
#[derive(Debug, Clone)]
pub struct KeyExchange {
    params: Arc<SidhParams>,
}

impl KeyExchange {
    pub fn new(params: Arc<SidhParams>) -> Self {
        Self { params }
    }

    /// Protocol instance over the built-in parameters
    pub fn with_global_params() -> Result<Self, SidhError> {
        let params = SidhParams::global()?;
        Ok(Self::new(Arc::new(params.clone())))
    }

    pub fn params(&self) -> &SidhParams {
        &self.params
    }

    /// Draw a uniform 2-side private key from the operating system
    pub fn generate_private_key_2(&self) -> Result<PrivateKey2, SidhError> {
        let mut value = random_scalar(self.params.msb_a)?;
        let key = PrivateKey2::new(value, &self.params);
        value.zeroize();
        key
    }

    /// Draw a uniform 3-side private key from the operating system
    pub fn generate_private_key_3(&self) -> Result<PrivateKey3, SidhError> {
        let mut value = random_scalar(self.params.msb_b)?;
        let key = PrivateKey3::new(value, &self.params);
        value.zeroize();
        key
    }

    pub fn generate_public_key_2(&self, private_key: &PrivateKey2) -> Result<PublicKey, SidhError> {
        isogen_2(&self.params, private_key.value)
    }

    pub fn generate_public_key_3(&self, private_key: &PrivateKey3) -> Result<PublicKey, SidhError> {
        isogen_3(&self.params, private_key.value)
    }

    /// Shared secret of the 2-side from its private key and the 3-side's public key
    pub fn compute_shared_secret_2(
        &self,
        private_key: &PrivateKey2,
        public_key: &PublicKey,
    ) -> Result<SharedSecret, SidhError> {
        let j_invariant = isoex_2(&self.params, public_key, private_key.value)?;
        shared_secret(j_invariant)
    }

    /// Shared secret of the 3-side from its private key and the 2-side's public key
    pub fn compute_shared_secret_3(
        &self,
        private_key: &PrivateKey3,
        public_key: &PublicKey,
    ) -> Result<SharedSecret, SidhError> {
        let j_invariant = isoex_3(&self.params, public_key, private_key.value)?;
        shared_secret(j_invariant)
    }
}

fn shared_secret(j_invariant: Fp2) -> Result<SharedSecret, SidhError> {
    let derived_key = derive_key_from_j_invariant(&j_invariant)?;
    Ok(SharedSecret {
        j_invariant,
        derived_key,
    })
}

/// Uniform scalar below 2^width
fn random_scalar(width: u32) -> Result<u32, SidhError> {
    let mut bytes = [0u8; 4];
    getrandom::getrandom(&mut bytes).map_err(|e| SidhError::KeyGenerationFailed {
        reason: e.to_string(),
    })?;
    let mask = u32::MAX.checked_shr(32 - width.min(32)).unwrap_or(0);
    let value = u32::from_be_bytes(bytes) & mask;
    bytes.zeroize();
    Ok(value)
}
