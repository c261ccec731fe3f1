// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Session key derivation vectors.
//!
//! These were computed with an independent implementation of the derivation
//! (Python, using the `cryptography` package for AES-128-ECB and `hashlib`
//! for SHA-256).

use hex_literal::hex;

/// Authentication key: `40 41 .. 4f`.
pub const AUTH_KEY: [u8; 16] = hex!("404142434445464748494a4b4c4d4e4f");

/// Reader challenge: `a0 a1 .. af`.
pub const RND_B: [u8; 16] = hex!("a0a1a2a3a4a5a6a7a8a9aaabacadaeaf");

/// `AES(AUTH_KEY, AUTH_KEY)`.
pub const WHITENED_KEY: [u8; 16] = hex!("80d2a5b08fa0ee51143b459e638106df");

/// `AES(WHITENED_KEY, RND_B)`.
pub const W: [u8; 16] = hex!("5069235040dbb5337ffb0193d15eb006");

/// The first hashed block: `00000000 || W || 026A5382E653`.
pub const BLOCK1: [u8; 26] =
    hex!("000000005069235040dbb5337ffb0193d15eb006026a5382e653");

/// The second hashed block: `00000001 || W || 026A`.
pub const BLOCK2: [u8; 22] = hex!("000000015069235040dbb5337ffb0193d15eb006026a");

/// The 64 bytes of key material: `SHA256(BLOCK1) || SHA256(BLOCK2)`.
pub const KEY_MATERIAL: [u8; 64] = hex!(
    "7d15966ba86fef049a320fcb0d438f7e"
    "33ab86c25c7b8796a624eae9f503c7d3"
    "aded03c8006db2c70f972069ca0d2b60"
    "d62c5ade01a8d7828206f402a1f93558"
);

/// [`RND_B`] with the low bit of its last byte flipped.
pub const RND_B_FLIPPED: [u8; 16] = hex!("a0a1a2a3a4a5a6a7a8a9aaabacadaeae");

/// The key material derived from [`AUTH_KEY`] and [`RND_B_FLIPPED`].
pub const KEY_MATERIAL_FLIPPED: [u8; 64] = hex!(
    "9c1c0a297455e20c14fff5e1dc705e49"
    "cbce873a66d721be2ad9d0837443e9bb"
    "78c627ec641bfd94bb6002b87e237b3b"
    "9a450a9600271bf742fd189e85df3834"
);
