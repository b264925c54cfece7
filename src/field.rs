// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! Field arithmetic modulo \\(p = 2\^{255} - 19\\).
//!
//! Field elements are represented in radix \\(2\^{51}\\) as five `u64`
//! limbs, with 128-bit intermediate products.  The limbs of a reduced
//! element are bounded by \\(2\^{51}\\), but are allowed to grow up to
//! \\(2\^{54}\\) between reductions, so that additions never need to
//! carry.
//!
//! This module also owns the byte codec for field elements: decoding
//! masks bit 255 of the input and accepts non-canonical encodings in
//! \\([p, 2\^{255})\\), while encoding always produces the canonical
//! representative in \\([0, p)\\), as RFC 7748 requires.

use core::fmt::Debug;
use core::ops::{Add, AddAssign};
use core::ops::{Mul, MulAssign};
use core::ops::{Sub, SubAssign};

use subtle::Choice;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Mask selecting the low 51 bits of a limb.
const LOW_51_BIT_MASK: u64 = (1u64 << 51) - 1;

/// An element of the field \\( \mathbb Z / (2\^{255} - 19) \\).
///
/// Internal limbs are not guaranteed to be reduced below \\(p\\) at all
/// times; [`FieldElement::to_bytes`] is the observation point and always
/// yields the canonical representative.
#[derive(Copy, Clone)]
pub(crate) struct FieldElement(pub(crate) [u64; 5]);

impl Debug for FieldElement {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "FieldElement({:?})", &self.0[..])
    }
}

impl ConstantTimeEq for FieldElement {
    /// Test equality of two field elements mod \\(p\\), in constant
    /// time, by comparing canonical encodings.
    fn ct_eq(&self, other: &FieldElement) -> Choice {
        self.to_bytes().ct_eq(&other.to_bytes())
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &FieldElement) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for FieldElement {}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &FieldElement, b: &FieldElement, choice: Choice) -> FieldElement {
        let mut limbs = [0u64; 5];
        for i in 0..5 {
            limbs[i] = u64::conditional_select(&a.0[i], &b.0[i], choice);
        }
        FieldElement(limbs)
    }

    fn conditional_assign(&mut self, other: &FieldElement, choice: Choice) {
        for i in 0..5 {
            self.0[i].conditional_assign(&other.0[i], choice);
        }
    }

    /// Limb-wise arithmetic-masked swap.  `u64::conditional_swap` is the
    /// XOR-mask form `d = m & (a ^ b); a ^= d; b ^= d` with
    /// `m = -(choice as i64)`, so no branch depends on `choice`.
    fn conditional_swap(a: &mut FieldElement, b: &mut FieldElement, choice: Choice) {
        for i in 0..5 {
            u64::conditional_swap(&mut a.0[i], &mut b.0[i], choice);
        }
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl<'b> AddAssign<&'b FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: &'b FieldElement) {
        for i in 0..5 {
            self.0[i] += rhs.0[i];
        }
    }
}

impl<'a, 'b> Add<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn add(self, rhs: &'b FieldElement) -> FieldElement {
        let mut output = *self;
        output += rhs;
        output
    }
}

impl<'b> SubAssign<&'b FieldElement> for FieldElement {
    fn sub_assign(&mut self, rhs: &'b FieldElement) {
        let result = (self as &FieldElement) - rhs;
        self.0 = result.0;
    }
}

impl<'a, 'b> Sub<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn sub(self, rhs: &'b FieldElement) -> FieldElement {
        // Add 16p to the minuend before subtracting, limb by limb, so
        // every limb stays nonnegative.  16p is larger than any 54-bit
        // bound on the subtrahend's limbs, and vanishes mod p.
        //
        // 16 * (2^51 - 19) = 36028797018963664
        // 16 * (2^51 -  1) = 36028797018963952
        FieldElement::reduce([
            (self.0[0] + 36028797018963664u64) - rhs.0[0],
            (self.0[1] + 36028797018963952u64) - rhs.0[1],
            (self.0[2] + 36028797018963952u64) - rhs.0[2],
            (self.0[3] + 36028797018963952u64) - rhs.0[3],
            (self.0[4] + 36028797018963952u64) - rhs.0[4],
        ])
    }
}

impl<'b> MulAssign<&'b FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: &'b FieldElement) {
        let result = (self as &FieldElement) * rhs;
        self.0 = result.0;
    }
}

impl<'a, 'b> Mul<&'b FieldElement> for &'a FieldElement {
    type Output = FieldElement;
    fn mul(self, rhs: &'b FieldElement) -> FieldElement {
        /// Multiply two 64-bit limbs, keeping the full 128-bit product.
        #[inline(always)]
        fn m(x: u64, y: u64) -> u128 {
            (x as u128) * (y as u128)
        }

        let a: &[u64; 5] = &self.0;
        let b: &[u64; 5] = &rhs.0;

        // Limbs must fit in 54 bits so that the carries computed in
        // carry_wide() below fit in a u64.
        debug_assert!(a.iter().all(|&ai| ai < (1 << 54)));
        debug_assert!(b.iter().all(|&bi| bi < (1 << 54)));

        // Schoolbook multiplication.  Products crossing the 2^255
        // boundary wrap around with a factor of 19, since
        // 2^255 = 19 (mod p); fold the 19 into the smaller operand
        // ahead of time to keep each product in 128 bits.
        let b1_19 = b[1] * 19;
        let b2_19 = b[2] * 19;
        let b3_19 = b[3] * 19;
        let b4_19 = b[4] * 19;

        let z = [
            m(a[0], b[0]) + m(a[4], b1_19) + m(a[3], b2_19) + m(a[2], b3_19) + m(a[1], b4_19),
            m(a[1], b[0]) + m(a[0], b[1]) + m(a[4], b2_19) + m(a[3], b3_19) + m(a[2], b4_19),
            m(a[2], b[0]) + m(a[1], b[1]) + m(a[0], b[2]) + m(a[4], b3_19) + m(a[3], b4_19),
            m(a[3], b[0]) + m(a[2], b[1]) + m(a[1], b[2]) + m(a[0], b[3]) + m(a[4], b4_19),
            m(a[4], b[0]) + m(a[3], b[1]) + m(a[2], b[2]) + m(a[1], b[3]) + m(a[0], b[4]),
        ];

        FieldElement::carry_wide(z)
    }
}

impl FieldElement {
    /// The zero element of the field.
    pub(crate) const ZERO: FieldElement = FieldElement::from_limbs([0, 0, 0, 0, 0]);

    /// The multiplicative identity of the field.
    pub(crate) const ONE: FieldElement = FieldElement::from_limbs([1, 0, 0, 0, 0]);

    /// Construct a field element directly from radix-2^51 limbs.
    pub(crate) const fn from_limbs(limbs: [u64; 5]) -> FieldElement {
        FieldElement(limbs)
    }

    /// Carry excess bits upward through the limbs, wrapping the carry
    /// out of the top limb back into the bottom with a factor of 19.
    ///
    /// Output limbs are bounded by \\(2\^{51} + \epsilon\\); the value
    /// is unchanged mod \\(p\\).
    #[inline(always)]
    fn reduce(mut limbs: [u64; 5]) -> FieldElement {
        for i in 0..4 {
            limbs[i + 1] += limbs[i] >> 51;
            limbs[i] &= LOW_51_BIT_MASK;
        }
        limbs[0] += (limbs[4] >> 51) * 19;
        limbs[4] &= LOW_51_BIT_MASK;

        FieldElement(limbs)
    }

    /// Carry a set of 128-bit product limbs down to 51-bit limbs.
    ///
    /// The inputs must be bounded by \\(2\^{114}\\), which holds for
    /// products of limbs bounded by \\(2\^{54}\\); the final carry then
    /// fits a u64 even after multiplication by 19.
    #[inline(always)]
    fn carry_wide(z: [u128; 5]) -> FieldElement {
        let mut out = [0u64; 5];
        let mut carry: u128 = 0;
        for i in 0..5 {
            let v = z[i] + carry;
            out[i] = (v as u64) & LOW_51_BIT_MASK;
            carry = v >> 51;
        }
        out[0] += (carry as u64) * 19;

        FieldElement::reduce(out)
    }

    /// Load a field element from the low 255 bits of a 256-bit string.
    ///
    /// Bit 255 is masked off before reduction, so this function will
    /// happily decode the non-canonical encodings in \\([p, 2\^{255})\\)
    /// to their reduced residues, e.g. \\(2\^{255} - 18\\) to \\(1\\).
    /// The caller's buffer is only read, never written.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> FieldElement {
        let mut limbs = [0u64; 5];
        let mut acc: u128 = 0;
        let mut acc_bits = 0u32;
        let mut i = 0;

        // Stream the little-endian bits into 51-bit limbs.
        for &byte in bytes.iter() {
            acc |= (byte as u128) << acc_bits;
            acc_bits += 8;
            if acc_bits >= 51 && i < 4 {
                limbs[i] = (acc as u64) & LOW_51_BIT_MASK;
                acc >>= 51;
                acc_bits -= 51;
                i += 1;
            }
        }
        // 52 bits remain; the mask discards bit 255.
        limbs[4] = (acc as u64) & LOW_51_BIT_MASK;

        FieldElement(limbs)
    }

    /// Serialize this field element to its canonical 32-byte
    /// little-endian encoding.
    pub(crate) fn to_bytes(&self) -> [u8; 32] {
        // First carry down to limbs < 2^51, giving a value h < 2^255.
        let mut limbs = FieldElement::reduce(self.0).0;

        // Write h = qp + r with 0 <= r < p; we want r.  Since h < 2^255
        // the quotient q is 0 or 1, and h >= p iff h + 19 >= 2^255, so
        // q is exactly the bit carried out of the top limb of h + 19.
        let mut q = (limbs[0] + 19) >> 51;
        for limb in &limbs[1..] {
            q = (limb + q) >> 51;
        }

        // r = h - qp = h + 19q - 2^255 q: add 19q, carry, and let the
        // mask on the top limb subtract the 2^255 q term.
        limbs[0] += 19 * q;
        for i in 0..4 {
            limbs[i + 1] += limbs[i] >> 51;
            limbs[i] &= LOW_51_BIT_MASK;
        }
        limbs[4] &= LOW_51_BIT_MASK;

        // Stream the 51-bit limbs back out as little-endian bytes.
        let mut s = [0u8; 32];
        let mut acc: u128 = 0;
        let mut acc_bits = 0u32;
        let mut i = 0;
        for &limb in limbs.iter() {
            acc |= (limb as u128) << acc_bits;
            acc_bits += 51;
            while acc_bits >= 8 {
                s[i] = acc as u8;
                acc >>= 8;
                acc_bits -= 8;
                i += 1;
            }
        }
        s[31] = acc as u8;

        // A canonical encoding never has the high bit set.
        debug_assert!((s[31] & 0b1000_0000u8) == 0u8);

        s
    }

    /// Determine whether this field element is zero, in constant time.
    pub(crate) fn is_zero(&self) -> Choice {
        self.to_bytes().ct_eq(&[0u8; 32])
    }

    #[inline(always)]
    fn square_inner(&self) -> [u128; 5] {
        #[inline(always)]
        fn m(x: u64, y: u64) -> u128 {
            (x as u128) * (y as u128)
        }

        let a: &[u64; 5] = &self.0;

        debug_assert!(a.iter().all(|&ai| ai < (1 << 54)));

        let a3_19 = 19 * a[3];
        let a4_19 = 19 * a[4];

        // The off-diagonal products of the schoolbook square each occur
        // twice; the wrapped products pick up the usual factor of 19.
        [
            m(a[0], a[0]) + 2 * (m(a[1], a4_19) + m(a[2], a3_19)),
            m(a[3], a3_19) + 2 * (m(a[0], a[1]) + m(a[2], a4_19)),
            m(a[1], a[1]) + 2 * (m(a[0], a[2]) + m(a[4], a3_19)),
            m(a[4], a4_19) + 2 * (m(a[0], a[3]) + m(a[1], a[2])),
            m(a[2], a[2]) + 2 * (m(a[0], a[4]) + m(a[1], a[3])),
        ]
    }

    /// Compute the square of this field element.
    pub(crate) fn square(&self) -> FieldElement {
        FieldElement::carry_wide(self.square_inner())
    }

    /// Compute `self^(2^k)` by `k` successive squarings.
    pub(crate) fn pow2k(&self, k: u32) -> FieldElement {
        debug_assert!(k > 0);
        let mut output = *self;
        for _ in 0..k {
            output = output.square();
        }
        output
    }

    /// Compute `(self^(2^250 - 1), self^11)`, the common prefix of the
    /// exponentiation chains for inversion and square roots.
    fn pow22501(&self) -> (FieldElement, FieldElement) {
        // 2^250 - 1 is a run of 250 one-bits.  Shifting a run of n ones
        // left by m places (m squarings) and merging in a run of m ones
        // (one multiply) gives a run of n + m ones, so the whole
        // exponent is assembled by repeatedly extending an all-ones run
        // from the 5-bit seed below.
        let x2 = self.square(); // x^2
        let x8 = x2.pow2k(2); // x^8
        let x9 = self * &x8; // x^9
        let x11 = &x9 * &x2; // x^11
        let ones5 = &x11.square() * &x9; // x^31 = x^(2^5 - 1)

        let ones10 = &ones5.pow2k(5) * &ones5; // x^(2^10 - 1)
        let ones20 = &ones10.pow2k(10) * &ones10; // x^(2^20 - 1)
        let ones40 = &ones20.pow2k(20) * &ones20; // x^(2^40 - 1)
        let ones50 = &ones40.pow2k(10) * &ones10; // x^(2^50 - 1)
        let ones100 = &ones50.pow2k(50) * &ones50; // x^(2^100 - 1)
        let ones200 = &ones100.pow2k(100) * &ones100; // x^(2^200 - 1)
        let ones250 = &ones200.pow2k(50) * &ones50; // x^(2^250 - 1)

        (ones250, x11)
    }

    /// Compute the multiplicative inverse of this field element as
    /// `self^(p - 2)`, by Fermat's little theorem.
    ///
    /// Zero has no inverse; this function returns zero on zero input,
    /// which is exactly what the ladder needs to encode the point at
    /// infinity as the zero string.
    pub(crate) fn invert(&self) -> FieldElement {
        // p - 2 = 2^255 - 21 = (2^250 - 1) * 2^5 + 11, i.e. the bit
        // pattern 11111...11101011.
        let (ones250, x11) = self.pow22501();
        &ones250.pow2k(5) * &x11
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Random element a of GF(2^255-19), from curve25519-dalek's test
    /// suite.
    const A_BYTES: [u8; 32] = [
        0x04, 0xfe, 0xdf, 0x98, 0xa7, 0xfa, 0x0a, 0x68, 0x84, 0x92, 0xbd, 0x59, 0x08, 0x07, 0xa7,
        0x03, 0x9e, 0xd1, 0xf6, 0xf2, 0xe1, 0xd9, 0xe2, 0xa4, 0xa4, 0x51, 0x47, 0x36, 0xf3, 0xc3,
        0xa9, 0x17,
    ];

    /// Byte representation of a**2.
    const ASQ_BYTES: [u8; 32] = [
        0x75, 0x97, 0x24, 0x9e, 0xe6, 0x06, 0xfe, 0xab, 0x24, 0x04, 0x56, 0x68, 0x07, 0x91, 0x2d,
        0x5d, 0x0b, 0x0f, 0x3f, 0x1c, 0xb2, 0x6e, 0xf2, 0xe2, 0x63, 0x9c, 0x12, 0xba, 0x73, 0x0b,
        0xe3, 0x62,
    ];

    /// Byte representation of 1/a.
    const AINV_BYTES: [u8; 32] = [
        0x96, 0x1b, 0xcd, 0x8d, 0x4d, 0x5e, 0xa2, 0x3a, 0xe9, 0x36, 0x37, 0x93, 0xdb, 0x7b, 0x4d,
        0x70, 0xb8, 0x0d, 0xc0, 0x55, 0xd0, 0x4c, 0x1d, 0x7b, 0x90, 0x71, 0xd8, 0xe9, 0xb6, 0x18,
        0xe6, 0x30,
    ];

    #[test]
    fn a_mul_a_vs_a_squared_constant() {
        let a = FieldElement::from_bytes(&A_BYTES);
        let asq = FieldElement::from_bytes(&ASQ_BYTES);
        assert_eq!(asq, &a * &a);
    }

    #[test]
    fn a_square_vs_a_squared_constant() {
        let a = FieldElement::from_bytes(&A_BYTES);
        let asq = FieldElement::from_bytes(&ASQ_BYTES);
        assert_eq!(asq, a.square());
    }

    #[test]
    fn a_invert_vs_inverse_of_a_constant() {
        let a = FieldElement::from_bytes(&A_BYTES);
        let ainv = FieldElement::from_bytes(&AINV_BYTES);
        let should_be_inverse = a.invert();
        assert_eq!(ainv, should_be_inverse);
        assert_eq!(FieldElement::ONE, &a * &should_be_inverse);
    }

    #[test]
    fn invert_zero_is_zero() {
        assert_eq!(FieldElement::ZERO.invert(), FieldElement::ZERO);
    }

    #[test]
    fn sub_normalizes_negative_intermediates() {
        // 0 - 1 must come back as the canonical encoding of p - 1, not
        // as a truncated two's-complement remainder.
        let minus_one = &FieldElement::ZERO - &FieldElement::ONE;
        let mut p_minus_one_bytes = [0xffu8; 32];
        p_minus_one_bytes[0] = 0xec;
        p_minus_one_bytes[31] = 0x7f;
        assert_eq!(minus_one.to_bytes(), p_minus_one_bytes);
    }

    #[test]
    fn add_sub_round_trip() {
        let a = FieldElement::from_bytes(&A_BYTES);
        let asq = FieldElement::from_bytes(&ASQ_BYTES);
        let sum = &a + &asq;
        assert_eq!(a, &sum - &asq);
    }

    #[test]
    fn from_bytes_masks_high_bit() {
        // An encoding that differs only in bit 255 decodes identically.
        let mut bytes = A_BYTES;
        bytes[31] |= 0b1000_0000;
        assert_eq!(
            FieldElement::from_bytes(&bytes),
            FieldElement::from_bytes(&A_BYTES)
        );

        // 2^255 alone masks down to zero.
        let mut high_bit_only = [0u8; 32];
        high_bit_only[31] = 0b1000_0000;
        assert_eq!(
            FieldElement::from_bytes(&high_bit_only).to_bytes(),
            [0u8; 32]
        );
    }

    #[test]
    fn from_bytes_reduces_non_canonical_input() {
        // p + 1 decodes to 1.
        let mut p_plus_one = [0xffu8; 32];
        p_plus_one[0] = 0xee;
        p_plus_one[31] = 0x7f;
        assert_eq!(FieldElement::from_bytes(&p_plus_one), FieldElement::ONE);
    }

    #[test]
    fn to_bytes_round_trips_canonical_encodings() {
        let a = FieldElement::from_bytes(&A_BYTES);
        assert_eq!(a.to_bytes(), A_BYTES);
    }

    #[test]
    fn conditional_swap_laws() {
        let a = FieldElement::from_bytes(&A_BYTES);
        let b = FieldElement::from_bytes(&ASQ_BYTES);

        let (mut x, mut y) = (a, b);
        FieldElement::conditional_swap(&mut x, &mut y, Choice::from(0));
        assert_eq!(x, a);
        assert_eq!(y, b);

        FieldElement::conditional_swap(&mut x, &mut y, Choice::from(1));
        assert_eq!(x, b);
        assert_eq!(y, a);

        let (mut s, mut t) = (a, a);
        FieldElement::conditional_swap(&mut s, &mut t, Choice::from(1));
        assert_eq!(s, a);
        assert_eq!(t, a);
    }
}
