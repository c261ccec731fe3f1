// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Test data of all kinds: hash and MAC vectors, cipher vectors, and session
//! key derivation vectors.

pub mod misc_crypto;
pub mod session;
