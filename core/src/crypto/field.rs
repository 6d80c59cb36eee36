// Copyright (c) 2024-2025 The PicoPot Developers

//! Prime-field arithmetic mod `q = 2^255 - 19`.
//!
//! Elements are four little-endian 64-bit limbs, always fully reduced.
//! Multiplication reduces the 512-bit product by folding with
//! `2^256 = 38 (mod q)`; inversion and square roots go through
//! exponentiation (Fermat's little theorem).

use once_cell::sync::Lazy;

/// Field modulus `q = 2^255 - 19`, little-endian limbs
pub(crate) const Q: [u64; 4] = [
    0xffff_ffff_ffff_ffed,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
];

/// `q - 2`, the inversion exponent
const Q_MINUS_2: [u64; 4] = [
    0xffff_ffff_ffff_ffeb,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
];

/// `(q + 3) / 8`, the candidate square-root exponent
const SQRT_EXP: [u64; 4] = [
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x0fff_ffff_ffff_ffff,
];

/// `(q - 1) / 4`, exponent deriving `sqrt(-1)` from 2
const SQRT_M1_EXP: [u64; 4] = [
    0xffff_ffff_ffff_fffb,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x1fff_ffff_ffff_ffff,
];

/// `sqrt(-1) mod q`, applied when the candidate root misses
pub(crate) static SQRT_M1: Lazy<Fe> = Lazy::new(|| Fe::from_u64(2).pow(&SQRT_M1_EXP));

/// `a >= b` over little-endian limbs
pub(crate) fn geq(a: &[u64; 4], b: &[u64; 4]) -> bool {
    for i in (0..4).rev() {
        if a[i] != b[i] {
            return a[i] > b[i];
        }
    }
    true
}

/// `a - b` over little-endian limbs, caller guarantees `a >= b`
pub(crate) fn sub_limbs(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let mut out = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
        let (v, b1) = a[i].overflowing_sub(b[i]);
        let (v, b2) = v.overflowing_sub(borrow);
        out[i] = v;
        borrow = (b1 | b2) as u64;
    }
    debug_assert_eq!(borrow, 0);
    out
}

/// Schoolbook 4x4 limb multiplication to a 512-bit product
pub(crate) fn mul_wide(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let mut w = [0u64; 8];
    for i in 0..4 {
        let mut carry = 0u64;
        for j in 0..4 {
            let t = w[i + j] as u128 + (a[i] as u128) * (b[j] as u128) + carry as u128;
            w[i + j] = t as u64;
            carry = (t >> 64) as u64;
        }
        w[i + 4] = carry;
    }
    w
}

/// Field element, fully reduced mod `q`
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Fe(pub(crate) [u64; 4]);

impl Fe {
    pub const ZERO: Fe = Fe([0, 0, 0, 0]);
    pub const ONE: Fe = Fe([1, 0, 0, 0]);

    pub fn from_u64(v: u64) -> Fe {
        Fe([v, 0, 0, 0])
    }

    /// Interpret 32 little-endian bytes, reducing mod `q`
    pub fn from_le_bytes(bytes: &[u8; 32]) -> Fe {
        let mut limbs = [0u64; 4];
        for (i, l) in limbs.iter_mut().enumerate() {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *l = u64::from_le_bytes(b);
        }
        // Values up to 2^256 - 1 need at most two subtractions
        while geq(&limbs, &Q) {
            limbs = sub_limbs(&limbs, &Q);
        }
        Fe(limbs)
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, l) in self.0.iter().enumerate() {
            out[i * 8..(i + 1) * 8].copy_from_slice(&l.to_le_bytes());
        }
        out
    }

    pub fn is_zero(&self) -> bool {
        *self == Fe::ZERO
    }

    /// Low bit of the canonical representation, the x-coordinate sign bit
    pub fn is_odd(&self) -> bool {
        self.0[0] & 1 == 1
    }

    pub fn add(&self, other: &Fe) -> Fe {
        // Both operands < q < 2^255, so the sum never carries out
        let mut limbs = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let t = self.0[i] as u128 + other.0[i] as u128 + carry as u128;
            limbs[i] = t as u64;
            carry = (t >> 64) as u64;
        }
        debug_assert_eq!(carry, 0);
        if geq(&limbs, &Q) {
            limbs = sub_limbs(&limbs, &Q);
        }
        Fe(limbs)
    }

    pub fn sub(&self, other: &Fe) -> Fe {
        // a - b as a + (q - b), keeping limbs non-negative
        let neg = if other.is_zero() {
            Fe::ZERO
        } else {
            Fe(sub_limbs(&Q, &other.0))
        };
        self.add(&neg)
    }

    pub fn neg(&self) -> Fe {
        Fe::ZERO.sub(self)
    }

    pub fn mul(&self, other: &Fe) -> Fe {
        let w = mul_wide(&self.0, &other.0);

        // Fold the high 256 bits: 2^256 = 38 (mod q)
        let mut acc = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let t = w[i] as u128 + (w[i + 4] as u128) * 38 + carry as u128;
            acc[i] = t as u64;
            carry = (t >> 64) as u64;
        }

        // Fold the (small) second-level carry the same way
        let mut t = carry.wrapping_mul(38);
        let mut limbs = acc;
        for l in limbs.iter_mut() {
            let (v, c) = l.overflowing_add(t);
            *l = v;
            t = c as u64;
            if t == 0 {
                break;
            }
        }
        // A final wrap past 2^256 contributes one more 38
        if t != 0 {
            let mut c = 38u64;
            for l in limbs.iter_mut() {
                let (v, o) = l.overflowing_add(c);
                *l = v;
                c = o as u64;
                if c == 0 {
                    break;
                }
            }
        }

        while geq(&limbs, &Q) {
            limbs = sub_limbs(&limbs, &Q);
        }
        Fe(limbs)
    }

    pub fn square(&self) -> Fe {
        self.mul(self)
    }

    /// Exponentiation by a 256-bit little-endian limb exponent
    pub fn pow(&self, exp: &[u64; 4]) -> Fe {
        let mut result = Fe::ONE;
        for i in (0..256).rev() {
            result = result.square();
            if (exp[i / 64] >> (i % 64)) & 1 == 1 {
                result = result.mul(self);
            }
        }
        result
    }

    /// Modular inverse via Fermat's little theorem.
    ///
    /// Undefined for zero; valid code paths never invert zero (the Edwards
    /// addition denominators cannot vanish on the curve).
    pub fn invert(&self) -> Fe {
        debug_assert!(!self.is_zero());
        self.pow(&Q_MINUS_2)
    }

    /// Candidate square root via the `(q + 3) / 8` exponent.
    ///
    /// Returns a root of `self` or of `-self`; the caller checks which and
    /// applies the `sqrt(-1)` correction.
    pub fn sqrt_candidate(&self) -> Fe {
        self.pow(&SQRT_EXP)
    }
}
