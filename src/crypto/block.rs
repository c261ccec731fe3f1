// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable 128-bit block ciphers.
//!
//! SSCP uses AES-128, but this crate does not implement it: integrations
//! supply one through [`Cipher`], which may be backed by hardware, a
//! certified library, or the [`aes` module] when the `aes` feature is
//! enabled.
//!
//! [`aes` module]: ../aes/index.html

use crate::crypto::Block;
use crate::crypto::Key;

/// An error returned by a block cipher.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that a block operation was requested before a key was set.
    NoKey,
    /// Indicates an unspecified, internal error.
    Unspecified,
}

/// A 128-bit block cipher with a 128-bit key, used one block at a time.
///
/// A `Cipher` holds at most one expanded key. The key schedule is computed
/// once by [`Cipher::set_key()`], and then used unchanged by every
/// [`Cipher::encrypt()`] and [`Cipher::decrypt()`] call until the next
/// `set_key()`.
pub trait Cipher {
    /// Expands `key`, replacing any previous key.
    fn set_key(&mut self, key: &Key) -> Result<(), Error>;

    /// Encrypts `block` in place.
    fn encrypt(&mut self, block: &mut Block) -> Result<(), Error>;

    /// Decrypts `block` in place.
    fn decrypt(&mut self, block: &mut Block) -> Result<(), Error>;
}
impl dyn Cipher {} // Ensure object-safe.

/// Convenience helpers over [`Cipher`].
#[extend::ext(name = CipherExt)]
pub impl<C: Cipher + ?Sized> C {
    /// Encrypts a single block under `key`, leaving that key installed.
    fn encrypt_with(
        &mut self,
        key: &Key,
        block: &mut Block,
    ) -> Result<(), Error> {
        self.set_key(key)?;
        self.encrypt(block)
    }
}
