// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic random numbers.
//!
//! The host draws one 16-byte challenge (`RndA`) per authentication attempt;
//! see [`Challenge::random()`].
//!
//! [`Challenge::random()`]: super::Challenge::random

/// An error returned by a CSRNG.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that the entropy source could not deliver the requested
    /// bytes. A `Csrng` must never report a short fill as success.
    Unspecified,
}

/// A cryptographically-secure random number generator.
///
/// The sole purpose of this type is to fill buffers with random bytes,
/// specifically for authentication challenges.
///
/// `Csrng`s must already be seeded with sufficient entropy, and must not fall
/// back to a non-cryptographic generator when that entropy is unavailable.
pub trait Csrng {
    /// Fills all of `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), Error>;
}
impl dyn Csrng {} // Ensure object-safe.
