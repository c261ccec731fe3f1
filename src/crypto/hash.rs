// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! SHA-256 hashing, including HMAC construction, as a pluggable engine.
//!
//! SSCP only ever hashes with SHA-256, and only ever MACs with a 128-bit
//! key, so unlike a general-purpose hashing API there is no algorithm
//! selection: digests are always a [`Digest`], keys always a [`Key`].
//!
//! In general, users of this module should be pulling in [`EngineExt`],
//! adds functions to [`Engine`] for more ergonomic usage, but which would
//! otherwise make it object-unsafe.

use crate::crypto::Digest;
use crate::crypto::Key;

/// An error returned by a hashing function.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that the engine was idle, but a write or finish
    /// operation was requested.
    Idle,

    /// Indicates an unspecified, internal error, including a failed
    /// comparison in [`Engine::compare_raw()`].
    Unspecified,
}

/// A hashing engine, which maintains the state for one digest.
///
/// Callers should not use the `raw` API directly; [`Hasher`] is a type-safe
/// wrapper that manages a session with an `Engine`.
///
/// Implementers only need to provide the "raw" form of the API; the remaining
/// functions are convenience helpers.
pub trait Engine {
    /// Begins a new hashing operation, discarding any previous state.
    ///
    /// If `key` is `Some`, this becomes an HMAC operation instead, using that
    /// as the key.
    fn start_raw(&mut self, key: Option<&Key>) -> Result<(), Error>;

    /// Adds `data` to the hashing state.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Completes the hashing/HMAC operation, returning the engine to idle.
    fn finish_raw(&mut self, out: &mut Digest) -> Result<(), Error>;

    /// Completes the hashing/HMAC operation, and then compares it to
    /// `expected`.
    ///
    /// Returns `Ok(())` if the hashes matched.
    fn compare_raw(&mut self, expected: &Digest) -> Result<(), Error>;
}
impl dyn Engine {} // Ensure object-safe.

/// Helpers for creating a [`Hasher`] from an [`Engine`].
#[extend::ext(name = EngineExt)]
pub impl<E: Engine + ?Sized> E {
    /// Begins a new hashing operation.
    ///
    /// Implementers do not need to implement this function themselves.
    #[inline]
    fn new_hash(&mut self) -> Result<Hasher<&mut Self>, Error> {
        self.start_raw(None)?;
        Ok(Hasher { engine: self })
    }

    /// Begins a new HMAC operation, using the given secret key.
    ///
    /// Implementers do not need to implement this function themselves.
    #[inline]
    fn new_hmac(&mut self, key: &Key) -> Result<Hasher<&mut Self>, Error> {
        self.start_raw(Some(key))?;
        Ok(Hasher { engine: self })
    }

    /// Convenience helper for hashing a contiguous memory region.
    ///
    /// Implementers do not need to implement this function themselves.
    #[inline]
    fn contiguous_hash(
        &mut self,
        buf: &[u8],
        out: &mut Digest,
    ) -> Result<(), Error> {
        let mut h = self.new_hash()?;
        h.write(buf)?;
        h.finish(out)
    }

    /// Convenience helper for HMAC'ing a contiguous memory region.
    ///
    /// Implementers do not need to implement this function themselves.
    #[inline]
    fn contiguous_hmac(
        &mut self,
        key: &Key,
        buf: &[u8],
        out: &mut Digest,
    ) -> Result<(), Error> {
        let mut h = self.new_hmac(key)?;
        h.write(buf)?;
        h.finish(out)
    }
}

/// A helper for managing a hashing operation with an [`Engine`].
///
/// Users should prefer to use this instead of calling [`Engine`]'s raw API
/// directly.
pub struct Hasher<E> {
    engine: E,
}

impl<E: Engine + ?Sized> Hasher<&mut E> {
    /// Adds `data` to the hashing state.
    pub fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.engine.write_raw(data)
    }

    /// Completes the hashing/HMAC operation, writing the result to `out`.
    pub fn finish(self, out: &mut Digest) -> Result<(), Error> {
        self.engine.finish_raw(out)
    }

    /// Completes the hashing/HMAC operation, comparing the result to
    /// `expected`.
    pub fn expect(self, expected: &Digest) -> Result<(), Error> {
        self.engine.compare_raw(expected)
    }
}
