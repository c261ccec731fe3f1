// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Cryptography for SSCP session establishment.
//!
//! SSCP only ever uses 128-bit keys, 128-bit blocks, and SHA-256; there is
//! no algorithm agility, and the types in this module hard-code those sizes
//! so that, e.g., a digest cannot be passed where a key is expected.
//!
//! Hashing is implemented in software in this crate ([`sha256`], [`hmac`]),
//! since it must be bit-exact with the reader firmware. The block cipher is
//! not: it is a pluggable capability ([`block::Cipher`]), with an
//! implementation based on the RustCrypto `aes` crate available under the
//! [`aes` module] when the `aes` feature is enabled.
//!
//! Like the block cipher, hashing and randomness are also exposed through
//! object-safe traits ([`hash::Engine`], [`csrng::Csrng`]). Implementations
//! based on the [`ring`] crate are provided under the [`ring` module],
//! controlled by the `ring` feature flag.
//!
//! It is recommended to not import the traits in this module directly, since
//! a lot of them have the same name. Instead, use imports like
//! `use sscp::crypto::hash;` and partially-qualified names like
//! `hash::Engine`.
//!
//! [`aes` module]: aes/index.html
//! [`ring` module]: ring/index.html

use core::fmt;

use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

#[cfg(feature = "aes")]
pub mod aes;
pub mod block;
pub mod cbc;
pub mod csrng;
pub mod hash;
pub mod hmac;
pub mod sha256;
pub mod soft;

#[cfg(feature = "ring")]
pub mod ring;

/// The length of every SSCP key, in bytes.
pub const KEY_LEN: usize = 16;

/// The length of a cipher block, in bytes.
pub const BLOCK_LEN: usize = 16;

/// The length of a SHA-256 digest (and of an HMAC-SHA256 tag), in bytes.
pub const DIGEST_LEN: usize = 32;

/// A raw 128-bit key.
pub type Key = [u8; KEY_LEN];

/// A single cipher block.
pub type Block = [u8; BLOCK_LEN];

/// A SHA-256 digest.
pub type Digest = [u8; DIGEST_LEN];

/// The long-term authentication key shared between the host and a reader.
///
/// This key is secret. It cannot be formatted (its `Debug` implementation
/// prints a placeholder), and it is wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthKey(Key);

impl AuthKey {
    /// Wraps raw key bytes.
    pub fn new(key: Key) -> Self {
        Self(key)
    }

    /// Returns the raw key, for feeding into a cipher.
    pub(crate) fn expose(&self) -> &Key {
        &self.0
    }
}

impl From<Key> for AuthKey {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("AuthKey(<redacted>)")
    }
}

/// A 16-byte random challenge exchanged during authentication.
///
/// The host's challenge is traditionally called `RndA`, and the reader's
/// `RndB`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Challenge(Block);

impl Challenge {
    /// Wraps raw challenge bytes.
    pub const fn new(bytes: Block) -> Self {
        Self(bytes)
    }

    /// Draws a fresh challenge from `rng`.
    pub fn random(rng: &mut dyn csrng::Csrng) -> Result<Self, csrng::Error> {
        let mut bytes = Block::default();
        rng.fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    /// Returns the challenge bytes.
    pub fn as_bytes(&self) -> &Block {
        &self.0
    }
}

impl From<Block> for Challenge {
    fn from(bytes: Block) -> Self {
        Self::new(bytes)
    }
}

/// One of the four keys derived for an authenticated session.
///
/// See [`crate::session::SessionKeys`].
#[derive(PartialEq, Eq, Zeroize)]
pub struct SessionKey(Key);

impl SessionKey {
    pub(crate) fn from_slice(bytes: &[u8]) -> Self {
        let mut key = Key::default();
        key.copy_from_slice(bytes);
        Self(key)
    }

    /// Returns the raw key.
    pub fn as_bytes(&self) -> &Key {
        &self.0
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::csrng::fake::Broken;
    use crate::crypto::csrng::fake::Counter;

    #[test]
    fn secrets_are_not_formatted() {
        let key = AuthKey::new([0xa5; KEY_LEN]);
        let text = format!("{:?}", key);
        assert!(!text.to_lowercase().contains("a5"));
        assert!(!text.contains("165"));

        let key = SessionKey::from_slice(&[0x3c; KEY_LEN]);
        assert_eq!(format!("{:?}", key), "SessionKey(<redacted>)");
    }

    #[test]
    fn challenge_is_drawn_from_rng() {
        let mut rng = Counter(7);
        let a = Challenge::random(&mut rng).unwrap();
        let b = Challenge::random(&mut rng).unwrap();
        assert_eq!(a.as_bytes()[0], 7);
        assert_eq!(a.as_bytes()[15], 22);
        assert_eq!(b.as_bytes()[0], 23);
        assert_ne!(a, b);
    }

    #[test]
    fn challenge_reports_rng_failure() {
        assert_eq!(
            Challenge::random(&mut Broken),
            Err(csrng::Error::Unspecified)
        );
    }
}
