// Copyright (c) 2024-2025 The PicoPot Developers

//! From-scratch Ed25519: twisted-Edwards point operations, canonical point
//! encoding, key generation, deterministic signing and verification.
//!
//! Points are affine over the field mod `q = 2^255 - 19`; addition uses the
//! twisted-Edwards formula and scalar multiplication is plain double-and-add.
//! The double-and-add running time depends on the bit pattern of the secret
//! scalar; a constant-time ladder would be a hardening beyond the observed
//! contract.

use once_cell::sync::Lazy;
use zeroize::Zeroize;

use super::field::{Fe, SQRT_M1};
use super::scalar::Scalar;
use super::sha512::Sha512;
use super::CryptoError;

/// Curve coefficient `d = -121665 / 121666 (mod q)`
static D: Lazy<Fe> = Lazy::new(|| {
    Fe::from_u64(121665)
        .neg()
        .mul(&Fe::from_u64(121666).invert())
});

/// Standard Ed25519 base point
pub static BASE: Lazy<Point> = Lazy::new(|| Point {
    x: Fe([
        0xc956_2d60_8f25_d51a,
        0x692c_c760_9525_a7b2,
        0xc0a4_e231_fdd6_dc5c,
        0x2169_36d3_cd6e_53fe,
    ]),
    y: Fe([
        0x6666_6666_6666_6658,
        0x6666_6666_6666_6666,
        0x6666_6666_6666_6666,
        0x6666_6666_6666_6666,
    ]),
});

/// Affine curve point
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Point {
    x: Fe,
    y: Fe,
}

impl Point {
    /// Group identity `(0, 1)`
    pub const IDENTITY: Point = Point {
        x: Fe::ZERO,
        y: Fe::ONE,
    };

    /// Twisted-Edwards addition
    pub fn add(&self, other: &Point) -> Point {
        let x1y2 = self.x.mul(&other.y);
        let x2y1 = other.x.mul(&self.y);
        let x1x2 = self.x.mul(&other.x);
        let y1y2 = self.y.mul(&other.y);
        let dxxyy = D.mul(&x1x2).mul(&y1y2);

        // Denominators 1 +/- d*x1*x2*y1*y2 are nonzero for curve points
        let x3 = x1y2.add(&x2y1).mul(&Fe::ONE.add(&dxxyy).invert());
        let y3 = y1y2.add(&x1x2).mul(&Fe::ONE.sub(&dxxyy).invert());

        Point { x: x3, y: y3 }
    }

    /// Double-and-add over the bits of `k` (little-endian limbs), identity
    /// as the starting accumulator
    pub fn scalar_mult(&self, k: &[u64; 4]) -> Point {
        let mut acc = Point::IDENTITY;
        let mut addend = *self;

        for i in 0..256 {
            if (k[i / 64] >> (i % 64)) & 1 == 1 {
                acc = acc.add(&addend);
            }
            addend = addend.add(&addend);
        }

        acc
    }

    /// Canonical 32-byte encoding: little-endian `y` with the sign bit of
    /// `x` packed into the top bit of the last byte
    pub fn encode(&self) -> [u8; 32] {
        let mut out = self.y.to_le_bytes();
        if self.x.is_odd() {
            out[31] |= 0x80;
        }
        out
    }

    /// Decode a canonical 32-byte point encoding.
    ///
    /// Recovers `x` from the curve equation via the candidate square root,
    /// the `sqrt(-1)` correction and the sign-conditional negation, then
    /// rejects anything that fails the full curve-equation check.
    pub fn decode(bytes: &[u8; 32]) -> Result<Point, CryptoError> {
        let sign = (bytes[31] >> 7) & 1;
        let mut y_bytes = *bytes;
        y_bytes[31] &= 0x7f;
        let y = Fe::from_le_bytes(&y_bytes);

        // x^2 = (y^2 - 1) / (d * y^2 + 1)
        let y2 = y.square();
        let u = y2.sub(&Fe::ONE);
        let v = D.mul(&y2).add(&Fe::ONE);
        let x2 = u.mul(&v.invert());

        let mut x = x2.sqrt_candidate();
        if x.square() != x2 {
            x = x.mul(&SQRT_M1);
        }

        if (x.is_odd() as u8) != sign {
            x = x.neg();
        }

        let p = Point { x, y };
        if !p.is_on_curve() {
            return Err(CryptoError::InvalidPoint);
        }

        Ok(p)
    }

    /// Full curve-equation check: `-x^2 + y^2 - 1 - d*x^2*y^2 == 0`
    fn is_on_curve(&self) -> bool {
        let x2 = self.x.square();
        let y2 = self.y.square();
        y2.sub(&x2)
            .sub(&Fe::ONE)
            .sub(&D.mul(&x2).mul(&y2))
            .is_zero()
    }
}

/// Standard scalar clamping: clear the low 3 bits, clear the top bit, set
/// bit 254. Required before interpreting hashed seed material as an
/// exponent.
pub fn clamp_scalar(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes[0] &= 0xf8;
    bytes[31] &= 0x7f;
    bytes[31] |= 0x40;
    bytes
}

fn limbs_from_le_bytes(bytes: &[u8; 32]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    for (i, l) in limbs.iter_mut().enumerate() {
        let mut b = [0u8; 8];
        b.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
        *l = u64::from_le_bytes(b);
    }
    limbs
}

/// Clamped secret exponent derived from a seed hash
fn secret_exponent(h: &[u8; 64]) -> [u64; 4] {
    let mut a_bytes = [0u8; 32];
    a_bytes.copy_from_slice(&h[..32]);
    let a = limbs_from_le_bytes(&clamp_scalar(a_bytes));
    a_bytes.zeroize();
    a
}

/// Derive the canonical 32-byte public key for a 32-byte seed
pub fn public_key(seed: &[u8; 32]) -> [u8; 32] {
    let mut h = Sha512::digest(seed);
    let a = secret_exponent(&h);
    h.zeroize();

    BASE.scalar_mult(&a).encode()
}

/// Deterministic signature over `message` with the given seed.
///
/// `sig = encode(R) || S` where `r = H(h[32..] || message) mod l`,
/// `R = r * B`, `k = H(encode(R) || encode(A) || message) mod l` and
/// `S = r + k * a (mod l)`.
pub fn sign(seed: &[u8; 32], message: &[u8]) -> [u8; 64] {
    let mut h = Sha512::digest(seed);
    let a = secret_exponent(&h);

    // Nonce from the hash prefix and the message
    let mut nonce_hash = Sha512::new();
    nonce_hash.update(&h[32..]);
    nonce_hash.update(message);
    let r = Scalar::from_wide_le_bytes(&nonce_hash.finalize());
    h.zeroize();

    let r_enc = BASE.scalar_mult(&r.0).encode();
    let a_enc = BASE.scalar_mult(&a).encode();

    // Challenge binds the nonce point, the public key and the message
    let mut challenge = Sha512::new();
    challenge.update(&r_enc);
    challenge.update(&a_enc);
    challenge.update(message);
    let k = Scalar::from_wide_le_bytes(&challenge.finalize());

    let s = r.add(&k.mul_unreduced(&a));

    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&r_enc);
    sig[32..].copy_from_slice(&s.to_le_bytes());
    sig
}

/// Verify a signature.
///
/// Accepts iff `S * B == R + k * A` with a canonical `S`. Any decode
/// failure or malformed length yields `false`, never an error.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let (pk, sig): (&[u8; 32], &[u8; 64]) =
        match (public_key.try_into(), signature.try_into()) {
            (Ok(p), Ok(s)) => (p, s),
            _ => return false,
        };

    let a = match Point::decode(pk) {
        Ok(p) => p,
        Err(_) => return false,
    };
    let r_enc: [u8; 32] = sig[..32].try_into().unwrap();
    let r = match Point::decode(&r_enc) {
        Ok(p) => p,
        Err(_) => return false,
    };

    let s = match Scalar::from_canonical_le_bytes(sig[32..].try_into().unwrap()) {
        Some(s) => s,
        None => return false,
    };

    // Challenge recomputed exactly as in signing
    let mut challenge = Sha512::new();
    challenge.update(&r_enc);
    challenge.update(pk);
    challenge.update(message);
    let k = Scalar::from_wide_le_bytes(&challenge.finalize());

    let lhs = BASE.scalar_mult(&s.0);
    let rhs = r.add(&a.scalar_mult(&k.0));

    lhs == rhs
}

#[cfg(test)]
mod test {
    use super::*;

    // RFC 8032 TEST 1 seed / public key pair
    const TEST_SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c3f8e2ae5b720392734029827d9f";
    const TEST_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    fn test_seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        hex::decode_to_slice(TEST_SEED, &mut seed).unwrap();
        seed
    }

    #[test]
    fn base_point_is_on_curve() {
        assert!(BASE.is_on_curve());
        assert!(Point::IDENTITY.is_on_curve());
    }

    #[test]
    fn identity_is_neutral() {
        assert_eq!(BASE.add(&Point::IDENTITY), *BASE);
        assert_eq!(Point::IDENTITY.add(&BASE), *BASE);
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut p = *BASE;
        for _ in 0..8 {
            assert_eq!(Point::decode(&p.encode()), Ok(p));
            p = p.add(&BASE);
        }
    }

    #[test]
    fn decode_rejects_off_curve_encodings() {
        let mut rejected = 0;
        let mut accepted = 0;
        for y in 2u8..=50 {
            let mut bytes = [0u8; 32];
            bytes[0] = y;
            match Point::decode(&bytes) {
                Ok(_) => accepted += 1,
                Err(CryptoError::InvalidPoint) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        // Roughly half of all y values have no curve point
        assert!(rejected > 0);
        assert!(accepted > 0);
    }

    #[test]
    fn rfc8032_public_key() {
        assert_eq!(hex::encode(public_key(&test_seed())), TEST_PUBLIC);
    }

    #[test]
    fn sign_verify_round_trip() {
        let seed = test_seed();
        let pk = public_key(&seed);
        let msg = b"lamports:1000";

        let sig = sign(&seed, msg);
        assert!(verify(&pk, msg, &sig));
    }

    #[test]
    fn signing_is_deterministic() {
        let seed = test_seed();
        let msg = b"same message";
        assert_eq!(sign(&seed, msg), sign(&seed, msg));
    }

    #[test]
    fn bit_flips_invalidate() {
        let seed = test_seed();
        let pk = public_key(&seed);
        let msg = b"transfer";
        let sig = sign(&seed, msg);

        // Flipped signature bits (sampled across R and S halves)
        for byte in [0usize, 17, 31, 32, 48, 63] {
            let mut bad = sig;
            bad[byte] ^= 0x01;
            assert!(!verify(&pk, msg, &bad), "sig byte {byte}");
        }

        // Flipped message bit
        let mut bad_msg = msg.to_vec();
        bad_msg[0] ^= 0x80;
        assert!(!verify(&pk, &bad_msg, &sig));
    }

    #[test]
    fn malformed_lengths_yield_false() {
        let seed = test_seed();
        let pk = public_key(&seed);
        let sig = sign(&seed, b"x");

        assert!(!verify(&pk[..31], b"x", &sig));
        assert!(!verify(&pk, b"x", &sig[..63]));
        assert!(!verify(&[], b"x", &[]));
    }

    #[test]
    fn non_canonical_s_is_rejected() {
        let seed = test_seed();
        let pk = public_key(&seed);
        let mut sig = sign(&seed, b"x");

        // Force S >= l by saturating its top bytes
        for b in sig[32..].iter_mut() {
            *b = 0xff;
        }
        assert!(!verify(&pk, b"x", &sig));
    }
}
