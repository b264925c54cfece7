// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! Scalar multiplication on the Montgomery form of Curve25519.
//!
//! Montgomery arithmetic works not on the curve itself, but on the
//! \\(u\\)-line, which discards sign information and unifies the curve
//! and its quadratic twist.  A point is represented by the affine
//! \\(u\\)-coordinate alone, with \\(u\_0(\mathcal O) = 0\\) for the
//! point at infinity; see [_Montgomery curves and their
//! arithmetic_][costello-smith] by Costello and Smith, section 5.4.
//!
//! Inside the ladder we use projective \\((U : W)\\) pairs with affine
//! \\(u = U / W\\), which defers the single field inversion to the very
//! end of a scalar multiplication.
//!
//! # Scalar Multiplication
//!
//! Scalar multiplication is provided by the `*` operator between a
//! [`Scalar`] and a [`MontgomeryPoint`], and by the byte-oriented
//! [`MontgomeryPoint::mul_clamped`] and
//! [`MontgomeryPoint::mul_base_clamped`], which clamp their scalar
//! argument as RFC 7748 specifies.
//!
//! [costello-smith]: https://eprint.iacr.org/2017/212.pdf

// We allow non snake_case names because coordinates in projective space
// are traditionally denoted by the capitalisation of their respective
// counterparts in affine space, and the ladder-step operands carry the
// names RFC 7748 gives them.
#![allow(non_snake_case)]

use core::hash::{Hash, Hasher};
use core::ops::Mul;

use crate::constants::{A24, X25519_BASEPOINT};
use crate::field::FieldElement;
use crate::scalar::Scalar;

use subtle::Choice;
use subtle::ConditionallySelectable;
use subtle::ConstantTimeEq;

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Holds the affine \\(u\\)-coordinate of a point on the Montgomery form
/// of Curve25519 or its twist, as a 32-byte little-endian string.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MontgomeryPoint(
    /// The little-endian encoding of the affine \\(u\\)-coordinate.
    pub [u8; 32],
);

/// Equality of `MontgomeryPoint`s is defined mod \\(p\\): encodings are
/// decoded and re-encoded canonically before comparison.
impl ConstantTimeEq for MontgomeryPoint {
    fn ct_eq(&self, other: &MontgomeryPoint) -> Choice {
        let self_fe = FieldElement::from_bytes(&self.0);
        let other_fe = FieldElement::from_bytes(&other.0);

        self_fe.ct_eq(&other_fe)
    }
}

impl PartialEq for MontgomeryPoint {
    fn eq(&self, other: &MontgomeryPoint) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for MontgomeryPoint {}

// Equal MontgomeryPoints must hash to the same value, so hash the
// canonical encoding rather than the raw bytes.
impl Hash for MontgomeryPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let canonical_bytes = FieldElement::from_bytes(&self.0).to_bytes();
        canonical_bytes.hash(state);
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for MontgomeryPoint {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl MontgomeryPoint {
    /// Multiply this point by a scalar derived from `bytes` by clamping,
    /// exactly the `scalarmult(k, u)` function of RFC 7748.
    pub fn mul_clamped(self, bytes: [u8; 32]) -> MontgomeryPoint {
        &Scalar::clamp(bytes) * &self
    }

    /// Multiply the X25519 basepoint (`u = 9`) by a scalar derived from
    /// `bytes` by clamping.
    pub fn mul_base_clamped(bytes: [u8; 32]) -> MontgomeryPoint {
        X25519_BASEPOINT.mul_clamped(bytes)
    }

    /// Determine in constant time whether this point encodes the
    /// \\(u = 0\\) output, i.e. whether a ladder run landed on the point
    /// at infinity or the order-2 point.
    pub fn is_identity(&self) -> bool {
        FieldElement::from_bytes(&self.0).is_zero().into()
    }

    /// View this point as an array of bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert this point to an array of bytes.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Run the Montgomery ladder over the bits of `scalar`.
    ///
    /// The iteration count is fixed at 255 (bits 254..0): clamping
    /// clears bit 255 and sets bit 254, so these are exactly the
    /// information-bearing bits, and the schedule never depends on the
    /// scalar's value.  The per-round swap flag is XOR-latched so that
    /// the two swaps of the textbook ladder collapse into one.
    fn ladder(&self, scalar: &Scalar) -> MontgomeryPoint {
        let affine_u = FieldElement::from_bytes(&self.0);
        let mut P = ProjectivePoint::identity();
        let mut Q = ProjectivePoint {
            U: affine_u,
            W: FieldElement::ONE,
        };
        let mut swap = Choice::from(0);

        for t in (0..255).rev() {
            let bit = scalar.bit(t);
            swap ^= bit;
            ProjectivePoint::conditional_swap(&mut P, &mut Q, swap);
            swap = bit;
            ladder_step(&mut P, &mut Q, &affine_u);
        }
        // swap now holds bit 0 of the scalar.
        ProjectivePoint::conditional_swap(&mut P, &mut Q, swap);

        P.as_affine()
    }
}

/// A point on the projective \\(u\\)-line, \\((U : W)\\) with affine
/// \\(u = U / W\\).
#[derive(Copy, Clone, Debug)]
struct ProjectivePoint {
    U: FieldElement,
    W: FieldElement,
}

impl ProjectivePoint {
    /// The (exceptional) point at infinity, \\((1 : 0)\\).
    fn identity() -> ProjectivePoint {
        ProjectivePoint {
            U: FieldElement::ONE,
            W: FieldElement::ZERO,
        }
    }

    /// Dehomogenize to an affine u-coordinate, \\(u = U W\^{-1}\\).
    ///
    /// When \\(W = 0\\) the inversion yields zero, so the point at
    /// infinity encodes as the all-zero string.
    fn as_affine(&self) -> MontgomeryPoint {
        let u = &self.U * &self.W.invert();
        MontgomeryPoint(u.to_bytes())
    }

    /// Swap the two points iff `choice` is set, by arithmetic masking.
    fn conditional_swap(a: &mut ProjectivePoint, b: &mut ProjectivePoint, choice: Choice) {
        FieldElement::conditional_swap(&mut a.U, &mut b.U, choice);
        FieldElement::conditional_swap(&mut a.W, &mut b.W, choice);
    }
}

/// One combined differential-addition-and-doubling step of the ladder.
///
/// Given \\(P = (U\_P : W\_P)\\), \\(Q = (U\_Q : W\_Q)\\) and the affine
/// \\(u\\)-coordinate of \\(Q - P\\), compute \\(P' = [2]P\\) and
/// \\(Q' = P + Q\\) in place.  The operand names follow the RFC 7748
/// pseudocode; all arithmetic is in \\(\mathbb F\_p\\) with the curve
/// constant \\(a24 = (486662 - 2)/4 = 121665\\).
fn ladder_step(P: &mut ProjectivePoint, Q: &mut ProjectivePoint, affine_QmP: &FieldElement) {
    let A = &P.U + &P.W; // A  = U_P + W_P
    let AA = A.square(); // AA = A^2
    let B = &P.U - &P.W; // B  = U_P - W_P
    let BB = B.square(); // BB = B^2
    let E = &AA - &BB; // E  = AA - BB = 4 U_P W_P
    let C = &Q.U + &Q.W; // C  = U_Q + W_Q
    let D = &Q.U - &Q.W; // D  = U_Q - W_Q
    let DA = &D * &A; // DA = D * A
    let CB = &C * &B; // CB = C * B

    P.U = &AA * &BB; // U_{[2]P} = AA * BB
    P.W = &E * &(&AA + &(&A24 * &E)); // W_{[2]P} = E (AA + a24 E)
    Q.U = (&DA + &CB).square(); // U_{P+Q} = (DA + CB)^2
    Q.W = affine_QmP * &(&DA - &CB).square(); // W_{P+Q} = u_{Q-P} (DA - CB)^2
}

/// Multiply this `MontgomeryPoint` by a clamped `Scalar`.
impl<'a, 'b> Mul<&'b Scalar> for &'a MontgomeryPoint {
    type Output = MontgomeryPoint;

    fn mul(self, scalar: &'b Scalar) -> MontgomeryPoint {
        self.ladder(scalar)
    }
}

impl<'a, 'b> Mul<&'b MontgomeryPoint> for &'a Scalar {
    type Output = MontgomeryPoint;

    fn mul(self, point: &'b MontgomeryPoint) -> MontgomeryPoint {
        point * self
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
