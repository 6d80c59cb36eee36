// Copyright (c) 2024-2025 The PicoPot Developers

//! Scalar arithmetic mod the curve group order
//! `l = 2^252 + 27742317777372353535851937790883648493`.
//!
//! Used for nonce and challenge reduction of 64-byte hash outputs and for
//! the signature equation `S = r + k * a (mod l)`. Reduction is bitwise
//! over the wide value, which is slow but only runs a handful of times per
//! signature.

use super::field::{geq, mul_wide, sub_limbs};

/// Group order `l`, little-endian limbs
pub(crate) const L: [u64; 4] = [
    0x5812_631a_5cf5_d3ed,
    0x14de_f9de_a2f7_9cd6,
    0x0000_0000_0000_0000,
    0x1000_0000_0000_0000,
];

/// Reduce a 512-bit little-endian limb value mod `l`
fn reduce_wide(w: &[u64; 8]) -> [u64; 4] {
    let mut r = [0u64; 4];
    for i in (0..512).rev() {
        // r = r * 2 + bit; r < l < 2^253 so the shift never carries out
        let mut carry = (w[i / 64] >> (i % 64)) & 1;
        for limb in r.iter_mut() {
            let t = (*limb << 1) | carry;
            carry = *limb >> 63;
            *limb = t;
        }
        debug_assert_eq!(carry, 0);

        if geq(&r, &L) {
            r = sub_limbs(&r, &L);
        }
    }
    r
}

/// Scalar mod `l`, little-endian limbs, fully reduced
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Scalar(pub(crate) [u64; 4]);

impl Scalar {
    /// Reduce a 64-byte little-endian value (a hash output) mod `l`
    pub fn from_wide_le_bytes(bytes: &[u8; 64]) -> Scalar {
        let mut w = [0u64; 8];
        for (i, l) in w.iter_mut().enumerate() {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *l = u64::from_le_bytes(b);
        }
        Scalar(reduce_wide(&w))
    }

    /// Interpret 32 little-endian bytes as a scalar, rejecting values `>= l`.
    ///
    /// Used for the `S` half of a signature, which must be canonical.
    pub fn from_canonical_le_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
        let mut limbs = [0u64; 4];
        for (i, l) in limbs.iter_mut().enumerate() {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *l = u64::from_le_bytes(b);
        }
        if geq(&limbs, &L) {
            return None;
        }
        Some(Scalar(limbs))
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, l) in self.0.iter().enumerate() {
            out[i * 8..(i + 1) * 8].copy_from_slice(&l.to_le_bytes());
        }
        out
    }

    pub fn add(&self, other: &Scalar) -> Scalar {
        // Both < l < 2^253, no carry out
        let mut limbs = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let t = self.0[i] as u128 + other.0[i] as u128 + carry as u128;
            limbs[i] = t as u64;
            carry = (t >> 64) as u64;
        }
        debug_assert_eq!(carry, 0);
        if geq(&limbs, &L) {
            limbs = sub_limbs(&limbs, &L);
        }
        Scalar(limbs)
    }

    /// `self * other mod l`, where `other` may be any 256-bit integer
    /// (the clamped secret exponent is used unreduced, as the scheme
    /// specifies)
    pub fn mul_unreduced(&self, other: &[u64; 4]) -> Scalar {
        Scalar(reduce_wide(&mul_wide(&self.0, other)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reduce_identities() {
        // l itself reduces to zero
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&Scalar(L).to_le_bytes());
        assert_eq!(Scalar::from_wide_le_bytes(&bytes), Scalar([0, 0, 0, 0]));

        // l + 5 reduces to 5
        let five = Scalar([5, 0, 0, 0]);
        let sum = Scalar(L).0;
        let mut w = [0u8; 64];
        let mut carry = 5u64;
        for (i, l) in sum.iter().enumerate() {
            let (v, c) = l.overflowing_add(carry);
            w[i * 8..(i + 1) * 8].copy_from_slice(&v.to_le_bytes());
            carry = c as u64;
        }
        assert_eq!(Scalar::from_wide_le_bytes(&w), five);
    }

    #[test]
    fn canonical_bounds() {
        assert!(Scalar::from_canonical_le_bytes(&Scalar(L).to_le_bytes()).is_none());

        let l_minus_1 = Scalar(sub_limbs(&L, &[1, 0, 0, 0]));
        assert_eq!(
            Scalar::from_canonical_le_bytes(&l_minus_1.to_le_bytes()),
            Some(l_minus_1)
        );
    }

    #[test]
    fn add_wraps_mod_l() {
        let l_minus_1 = Scalar(sub_limbs(&L, &[1, 0, 0, 0]));
        assert_eq!(l_minus_1.add(&Scalar([1, 0, 0, 0])), Scalar([0, 0, 0, 0]));
    }

    #[test]
    fn mul_small_values() {
        let a = Scalar([3, 0, 0, 0]);
        assert_eq!(a.mul_unreduced(&[7, 0, 0, 0]), Scalar([21, 0, 0, 0]));
    }
}
