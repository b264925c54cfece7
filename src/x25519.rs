// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! x25519 Diffie-Hellman key exchange
//!
//! This implements x25519 key exchange as specified by Mike Hamburg
//! and Adam Langley in [RFC7748](https://tools.ietf.org/html/rfc7748).

use crate::errors::{InternalError, KeyExchangeError};
use crate::montgomery::MontgomeryPoint;
use crate::scalar::{self, clamp_integer};

use rand_core::CryptoRng;
#[cfg(feature = "os_rng")]
use rand_core::TryRngCore;

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A Diffie-Hellman public key.
///
/// We implement `Zeroize` so that downstream consumers may derive it for
/// `Drop` should they wish to erase public keys from memory.  Note that
/// this erasure (in this crate) does *not* automatically happen, but
/// either must be derived for Drop or explicitly called.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub struct PublicKey(pub(crate) MontgomeryPoint);

impl From<[u8; 32]> for PublicKey {
    /// Given a byte array, construct a x25519 `PublicKey`.
    fn from(bytes: [u8; 32]) -> PublicKey {
        PublicKey(MontgomeryPoint(bytes))
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyExchangeError;

    /// Construct a `PublicKey` from a slice, failing if the slice is
    /// not exactly 32 bytes long.
    fn try_from(bytes: &[u8]) -> Result<PublicKey, KeyExchangeError> {
        let bytes: [u8; 32] =
            bytes
                .try_into()
                .map_err(|_| KeyExchangeError(InternalError::BytesLengthError {
                    name: "PublicKey",
                    length: 32,
                }))?;
        Ok(PublicKey::from(bytes))
    }
}

impl PublicKey {
    /// Convert this public key to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// View this public key as a byte array.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl AsRef<[u8]> for PublicKey {
    /// View this public key as a byte array.
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for PublicKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// A short-lived Diffie-Hellman secret key that can only be used to
/// compute a single [`SharedSecret`].
///
/// This type is identical to the [`StaticSecret`] type, except that the
/// [`EphemeralSecret::diffie_hellman`] method consumes and then wipes
/// the secret key, and there are no serialization methods defined.  This
/// means that [`EphemeralSecret`]s can only be generated from fresh
/// randomness where the compiler statically checks that the resulting
/// secret is used at most once.
pub struct EphemeralSecret(pub(crate) [u8; 32]);

impl EphemeralSecret {
    /// Perform a Diffie-Hellman key agreement between `self` and
    /// `their_public` key to produce a [`SharedSecret`].
    pub fn diffie_hellman(self, their_public: &PublicKey) -> SharedSecret {
        SharedSecret(their_public.0.mul_clamped(self.0))
    }

    /// Generate a new [`EphemeralSecret`] with the supplied RNG: draw 32
    /// uniformly random bytes and clamp them.
    pub fn random_from_rng<R: CryptoRng + ?Sized>(csprng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        csprng.fill_bytes(&mut bytes);
        EphemeralSecret(clamp_integer(bytes))
    }

    /// Generate a new [`EphemeralSecret`] from the operating system's
    /// entropy source.
    #[cfg(feature = "os_rng")]
    pub fn random() -> Self {
        Self::random_from_rng(&mut rand_core::OsRng.unwrap_err())
    }
}

impl<'a> From<&'a EphemeralSecret> for PublicKey {
    /// Given an x25519 [`EphemeralSecret`] key, compute its
    /// corresponding [`PublicKey`].
    fn from(secret: &'a EphemeralSecret) -> PublicKey {
        PublicKey(MontgomeryPoint::mul_base_clamped(secret.0))
    }
}

impl Drop for EphemeralSecret {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        self.0.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for EphemeralSecret {}

/// A Diffie-Hellman secret key that can be used to compute multiple
/// [`SharedSecret`]s.
///
/// This type is identical to the [`EphemeralSecret`] type, except that
/// the [`StaticSecret::diffie_hellman`] method does not consume the
/// secret key, and the type provides serialization methods to save and
/// load key material.  This means that the secret may be used multiple
/// times (but does not *have to be*).
///
/// # Warning
///
/// If you're uncertain about whether you should use this, then you
/// likely should not be using this.  Our strongly recommended advice is
/// to use [`EphemeralSecret`] at all times, as that type enforces
/// at compile-time that secret keys are never reused, which can have
/// very serious security implications for many protocols.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[u8; 32]")
)]
#[derive(Clone)]
pub struct StaticSecret([u8; 32]);

impl StaticSecret {
    /// Perform a Diffie-Hellman key agreement between `self` and
    /// `their_public` key to produce a [`SharedSecret`].
    pub fn diffie_hellman(&self, their_public: &PublicKey) -> SharedSecret {
        SharedSecret(their_public.0.mul_clamped(self.0))
    }

    /// Generate a new [`StaticSecret`] with the supplied RNG: draw 32
    /// uniformly random bytes and clamp them.
    pub fn random_from_rng<R: CryptoRng + ?Sized>(csprng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        csprng.fill_bytes(&mut bytes);
        StaticSecret(clamp_integer(bytes))
    }

    /// Generate a new [`StaticSecret`] from the operating system's
    /// entropy source.
    #[cfg(feature = "os_rng")]
    pub fn random() -> Self {
        Self::random_from_rng(&mut rand_core::OsRng.unwrap_err())
    }

    /// Extract this key's bytes for serialization.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// View this key as a byte array.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for StaticSecret {
    /// Load a secret key from a byte array, clamping it in the process.
    fn from(bytes: [u8; 32]) -> StaticSecret {
        StaticSecret(clamp_integer(bytes))
    }
}

impl TryFrom<&[u8]> for StaticSecret {
    type Error = KeyExchangeError;

    /// Load a secret key from a slice, failing if the slice is not
    /// exactly 32 bytes long; the bytes are clamped in the process.
    fn try_from(bytes: &[u8]) -> Result<StaticSecret, KeyExchangeError> {
        let bytes: [u8; 32] =
            bytes
                .try_into()
                .map_err(|_| KeyExchangeError(InternalError::BytesLengthError {
                    name: "StaticSecret",
                    length: 32,
                }))?;
        Ok(StaticSecret::from(bytes))
    }
}

impl<'a> From<&'a StaticSecret> for PublicKey {
    /// Given an x25519 [`StaticSecret`] key, compute its corresponding
    /// [`PublicKey`].
    fn from(secret: &'a StaticSecret) -> PublicKey {
        PublicKey(MontgomeryPoint::mul_base_clamped(secret.0))
    }
}

impl AsRef<[u8]> for StaticSecret {
    /// View this key as a byte array.
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Drop for StaticSecret {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        self.0.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for StaticSecret {}

/// The result of a Diffie-Hellman key exchange.
///
/// Each party computes this using their [`EphemeralSecret`] or
/// [`StaticSecret`] and their counterparty's [`PublicKey`].
pub struct SharedSecret(pub(crate) MontgomeryPoint);

impl SharedSecret {
    /// Convert this shared secret to a byte array.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// View this shared secret key as a byte array.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Ensure in constant-time that this shared secret did not result
    /// from a key exchange with non-contributory behaviour.
    ///
    /// In some more exotic protocols which need to guarantee
    /// "contributory" behaviour for both parties, that is, that each
    /// party contributed a public value which increased the security of
    /// the resulting shared secret.  Since an all-zero public key forces
    /// the shared secret to be all-zero regardless of the other party's
    /// contribution, such protocols must reject it; RFC 7748 itself
    /// leaves this check to the caller.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key exchange was contributory (good), and
    /// `false` otherwise (can be bad for some protocols).
    #[must_use]
    pub fn was_contributory(&self) -> bool {
        !self.0.is_identity()
    }
}

impl AsRef<[u8]> for SharedSecret {
    /// View this shared secret key as a byte array.
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        #[cfg(feature = "zeroize")]
        self.0.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for SharedSecret {}

/// Check whether `bytes` is a well-formed x25519 private key: exactly 32
/// bytes, already in clamped form (low three bits clear, bit 254 set,
/// bit 255 clear).
///
/// Private keys produced by this crate's generators are always clamped,
/// so this predicate accepts exactly the keys they emit.  It is
/// deliberately stricter than [`is_valid_public_key`]: an unclamped
/// 32-byte string is a usable *scalar* (the ladder clamps on entry) but
/// not a well-formed private *key*.
pub fn is_valid_private_key(bytes: &[u8]) -> bool {
    match <&[u8; 32]>::try_from(bytes) {
        Ok(bytes) => scalar::is_clamped(bytes),
        Err(_) => false,
    }
}

/// Check whether `bytes` is a well-formed x25519 public key.
///
/// RFC 7748 public keys are opaque 32-byte strings: every value of the
/// right length is accepted, including non-canonical u-coordinates and
/// the all-zero string.  Callers needing contributory behaviour should
/// check [`SharedSecret::was_contributory`] instead of filtering public
/// keys here.
pub fn is_valid_public_key(bytes: &[u8]) -> bool {
    bytes.len() == 32
}

/// The bare, byte-oriented x25519 function, exactly as specified in
/// RFC7748.
///
/// This can be used with [`X25519_BASEPOINT_BYTES`] for people who
/// cannot use the better, safer, and faster ephemeral DH API.
///
/// # Example
/// ```
/// use x25519_kex::{x25519, X25519_BASEPOINT_BYTES, StaticSecret, PublicKey};
///
/// // Generate Alice's key pair.
/// let alice_secret = StaticSecret::random();
/// let alice_public = PublicKey::from(&alice_secret);
///
/// // Generate Bob's key pair.
/// let bob_secret = StaticSecret::random();
/// let bob_public = PublicKey::from(&bob_secret);
///
/// // Alice and Bob should now exchange their public keys.
///
/// // Once they've done so, they may generate a shared secret.
/// let alice_shared = x25519(alice_secret.to_bytes(), bob_public.to_bytes());
/// let bob_shared = x25519(bob_secret.to_bytes(), alice_public.to_bytes());
///
/// assert_eq!(alice_shared, bob_shared);
/// ```
pub fn x25519(k: [u8; 32], u: [u8; 32]) -> [u8; 32] {
    MontgomeryPoint(u).mul_clamped(k).to_bytes()
}

/// The X25519 basepoint, for use with the bare, byte-oriented x25519
/// function.  This is provided for people who cannot use the typed
/// DH API for some reason.
pub const X25519_BASEPOINT_BYTES: [u8; 32] = [
    9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ephemeral_diffie_hellman_symmetry() {
        let mut rng = rand::rng();
        let alice_secret = EphemeralSecret::random_from_rng(&mut rng);
        let alice_public = PublicKey::from(&alice_secret);
        let bob_secret = EphemeralSecret::random_from_rng(&mut rng);
        let bob_public = PublicKey::from(&bob_secret);

        let alice_shared = alice_secret.diffie_hellman(&bob_public);
        let bob_shared = bob_secret.diffie_hellman(&alice_public);

        assert_eq!(alice_shared.as_bytes(), bob_shared.as_bytes());
        assert!(alice_shared.was_contributory());
    }

    #[test]
    fn static_diffie_hellman_symmetry() {
        let mut rng = rand::rng();
        let alice_secret = StaticSecret::random_from_rng(&mut rng);
        let alice_public = PublicKey::from(&alice_secret);
        let bob_secret = StaticSecret::random_from_rng(&mut rng);
        let bob_public = PublicKey::from(&bob_secret);

        // A static secret survives multiple agreements.
        let first = alice_secret.diffie_hellman(&bob_public);
        let second = alice_secret.diffie_hellman(&bob_public);
        let theirs = bob_secret.diffie_hellman(&alice_public);

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(first.as_bytes(), theirs.as_bytes());
    }

    #[test]
    fn generated_private_keys_are_clamped() {
        let mut rng = rand::rng();
        for _ in 0..32 {
            let secret = StaticSecret::random_from_rng(&mut rng);
            assert!(is_valid_private_key(secret.as_bytes()));
        }
    }

    #[test]
    fn bare_x25519_agrees_with_the_typed_api() {
        let mut rng = rand::rng();
        let secret = StaticSecret::random_from_rng(&mut rng);
        let public = PublicKey::from(&secret);

        assert_eq!(
            x25519(secret.to_bytes(), X25519_BASEPOINT_BYTES),
            public.to_bytes()
        );
    }

    #[test]
    fn zero_public_key_is_non_contributory() {
        let mut rng = rand::rng();
        let secret = EphemeralSecret::random_from_rng(&mut rng);
        let zero_public = PublicKey::from([0u8; 32]);

        let shared = secret.diffie_hellman(&zero_public);
        assert_eq!(shared.to_bytes(), [0u8; 32]);
        assert!(!shared.was_contributory());
    }

    #[test]
    fn private_key_validity_requires_clamping() {
        let clamped = clamp_integer([0xa5u8; 32]);
        assert!(is_valid_private_key(&clamped));

        let mut unclamped = clamped;
        unclamped[0] |= 0b0000_0001;
        assert!(!is_valid_private_key(&unclamped));

        // Wrong lengths are rejected outright.
        assert!(!is_valid_private_key(&clamped[..31]));
        assert!(!is_valid_private_key(&[0u8; 33]));
    }

    #[test]
    fn public_key_validity_is_length_only() {
        assert!(is_valid_public_key(&[0u8; 32]));
        assert!(is_valid_public_key(&[0xffu8; 32]));
        assert!(!is_valid_public_key(&[0u8; 31]));
        assert!(!is_valid_public_key(&[0u8; 33]));
        assert!(!is_valid_public_key(&[]));
    }

    #[test]
    fn slice_constructors_reject_wrong_lengths() {
        let long = [0u8; 64];

        assert!(PublicKey::try_from(&long[..32]).is_ok());
        assert!(PublicKey::try_from(&long[..31]).is_err());
        assert!(PublicKey::try_from(&long[..]).is_err());

        assert!(StaticSecret::try_from(&long[..32]).is_ok());
        assert!(StaticSecret::try_from(&long[..33]).is_err());

        let err = PublicKey::try_from(&long[..7]).unwrap_err();
        assert_eq!(
            std::format!("{}", err),
            "PublicKey must be 32 bytes in length"
        );
    }

    #[test]
    fn static_secret_from_bytes_clamps() {
        let secret = StaticSecret::from([0xffu8; 32]);
        assert!(is_valid_private_key(secret.as_bytes()));
    }
}
