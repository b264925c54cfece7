// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

#![no_std]
#![deny(missing_docs)] // refuse to compile if documentation is missing
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]

#[cfg(any(test, feature = "std"))]
extern crate std;

// Low-level operations on field elements and points on the u-line.

mod constants;
mod field;
pub mod montgomery;
pub mod scalar;

// Errors raised at the byte-string boundary.

pub mod errors;

// The Diffie-Hellman key exchange API.

mod x25519;

pub use crate::x25519::*;
