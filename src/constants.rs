// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! Curve constants for the Montgomery form of Curve25519,
//! \\(v\^2 = u\^3 + 486662 u\^2 + u\\) over \\(\mathbb F\_{2\^{255}-19}\\).

use crate::field::FieldElement;
use crate::montgomery::MontgomeryPoint;

/// `a24 = (A - 2) / 4 = 121665`, the curve constant appearing in the
/// Montgomery ladder's doubling formula.
pub(crate) const A24: FieldElement = FieldElement::from_limbs([121665, 0, 0, 0, 0]);

/// The X25519 basepoint, with `u = 9`.
pub(crate) const X25519_BASEPOINT: MontgomeryPoint = MontgomeryPoint([
    9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0,
]);
