// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! Errors which may occur when parsing keys from wire-format byte strings.

use core::fmt;
use core::fmt::Display;

/// Internal errors.  Most application-level developers will likely not
/// need to pay any attention to these.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum InternalError {
    /// An error in the length of bytes handed to a constructor.
    ///
    /// To use this, pass a string specifying the `name` of the type
    /// which is returning the error, and the `length` in bytes which
    /// its constructor expects.
    BytesLengthError {
        name: &'static str,
        length: usize,
    },
}

impl Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InternalError::BytesLengthError { name: n, length: l } => {
                write!(f, "{} must be {} bytes in length", n, l)
            }
        }
    }
}

/// An error which may occur while processing key material.
///
/// This error arises when a slice with a length different to the 32
/// bytes expected for the type at hand is handed to a constructor.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct KeyExchangeError(pub(crate) InternalError);

impl Display for KeyExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KeyExchangeError {}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn length_error_names_the_offending_type() {
        let err = KeyExchangeError(InternalError::BytesLengthError {
            name: "PublicKey",
            length: 32,
        });
        assert_eq!(
            std::format!("{}", err),
            "PublicKey must be 32 bytes in length"
        );
    }
}
