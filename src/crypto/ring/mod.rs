// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementations of crypto traits, using the [`ring`] crate.
//!
//! This module provides implementations of [`crypto`] traits suitable for
//! hosts that would rather trust `ring` than this crate's own SHA-256, and
//! the OS-backed random source used to draw challenges. Some submodules
//! depend on the `std` feature flag.
//!
//! Types in this module, much like those in [`crypto`], should not be imported
//! directly. Instead, names such as `ring::csrng::Csrng` should be used
//! instead.
//!
//! The [`ring` warranty disclaimer] applies to this module as well.
//!
//! [`ring` warranty disclaimer]: https://github.com/briansmith/ring/blob/main/README.md

#[cfg(feature = "std")]
pub mod csrng;
pub mod hash;

#[cfg(doc)]
use crate::crypto;
