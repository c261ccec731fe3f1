// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementations of crypto traits on top of this crate's own primitives.
//!
//! Unlike [`crypto::ring`], everything in this module is available on
//! `no_std` targets, and computes exactly what the reader firmware computes.
//!
//! [`crypto::ring`]: ../ring/index.html

pub mod hash;
