// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! X25519 scalars and the RFC 7748 clamping operation.
//!
//! An X25519 scalar is not an element of a ring here: the Montgomery
//! ladder consumes it purely as a string of 255 bits.  The [`Scalar`]
//! type therefore stores the clamped 32-byte encoding directly and
//! exposes nothing but byte and bit access.

use subtle::Choice;
use subtle::ConstantTimeEq;

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Clamp a 32-byte string into an X25519 scalar encoding.
///
/// Clamping clears the low three bits (making the scalar a multiple of
/// the cofactor 8, which collapses small-subgroup components), clears
/// bit 255 and sets bit 254 (fixing the scalar's bit length so the
/// ladder's iteration count carries no information about the value).
///
/// This operation is idempotent.
pub const fn clamp_integer(mut bytes: [u8; 32]) -> [u8; 32] {
    bytes[0] &= 0b1111_1000;
    bytes[31] &= 0b0111_1111;
    bytes[31] |= 0b0100_0000;
    bytes
}

/// Check whether a 32-byte string is already in clamped form.
///
/// Equivalent to `clamp_integer(*bytes) == *bytes`.
pub(crate) const fn is_clamped(bytes: &[u8; 32]) -> bool {
    (bytes[0] & 0b0000_0111) == 0 && (bytes[31] & 0b1100_0000) == 0b0100_0000
}

/// A clamped X25519 scalar.
///
/// The only way to construct a `Scalar` from arbitrary bytes is
/// [`Scalar::clamp`], so every value of this type satisfies the clamped
/// invariant: bits 0-2 clear, bit 254 set, bit 255 clear.
#[derive(Copy, Clone, Debug)]
pub struct Scalar {
    bytes: [u8; 32],
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Scalar) -> Choice {
        self.bytes.ct_eq(&other.bytes)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Scalar) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl Scalar {
    /// Construct a `Scalar` by clamping the given bytes.
    pub const fn clamp(bytes: [u8; 32]) -> Scalar {
        Scalar {
            bytes: clamp_integer(bytes),
        }
    }

    /// View this scalar's clamped little-endian encoding.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Convert this scalar to its clamped little-endian encoding.
    pub const fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Extract bit `index` of the scalar as a `Choice`.
    pub(crate) fn bit(&self, index: usize) -> Choice {
        debug_assert!(index < 256);
        Choice::from((self.bytes[index >> 3] >> (index & 7)) & 1)
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clamping_is_idempotent() {
        let k = [0xffu8; 32];
        assert_eq!(clamp_integer(clamp_integer(k)), clamp_integer(k));

        let k = [0u8; 32];
        assert_eq!(clamp_integer(clamp_integer(k)), clamp_integer(k));
    }

    #[test]
    fn clamped_bytes_pass_the_clamp_check() {
        let mut k = [0u8; 32];
        for (i, byte) in k.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(0x5d) ^ 0xa7;
        }
        assert!(is_clamped(&clamp_integer(k)));
    }

    #[test]
    fn clamp_forces_the_fixed_bits() {
        let clamped = clamp_integer([0xffu8; 32]);
        // Multiple of 8.
        assert_eq!(clamped[0] & 0b0000_0111, 0);
        // Bit 254 set, bit 255 clear.
        assert_eq!(clamped[31] & 0b1100_0000, 0b0100_0000);
    }

    #[test]
    fn unclamped_bytes_fail_the_clamp_check() {
        // Low bit set.
        let mut k = clamp_integer([0u8; 32]);
        k[0] |= 1;
        assert!(!is_clamped(&k));

        // High bit set.
        let mut k = clamp_integer([0u8; 32]);
        k[31] |= 0b1000_0000;
        assert!(!is_clamped(&k));

        // Bit 254 clear.
        let mut k = clamp_integer([0u8; 32]);
        k[31] &= 0b1011_1111;
        assert!(!is_clamped(&k));
    }

    #[test]
    fn scalar_bits_match_the_encoding() {
        let scalar = Scalar::clamp([0xffu8; 32]);
        // Bits 0-2 cleared by clamping.
        assert_eq!(scalar.bit(0).unwrap_u8(), 0);
        assert_eq!(scalar.bit(1).unwrap_u8(), 0);
        assert_eq!(scalar.bit(2).unwrap_u8(), 0);
        assert_eq!(scalar.bit(3).unwrap_u8(), 1);
        // Bit 254 set, bit 255 cleared.
        assert_eq!(scalar.bit(254).unwrap_u8(), 1);
        assert_eq!(scalar.bit(255).unwrap_u8(), 0);
    }
}
