// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Known-answer vectors for SHA-256, HMAC-SHA256 and AES-128-CBC.
//!
//! The SHA-256 and CBC vectors come from FIPS 180-2 and NIST SP 800-38A. The
//! others were generated with Python's `hashlib` and `hmac` modules.

use hex_literal::hex;

/// Returns `len` bytes of a fixed, non-repeating-per-block test pattern:
/// `msg[i] = 7 * i + 3 (mod 256)`.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

/// SHA-256 of the empty message.
pub const EMPTY_SHA256: &[u8; 32] = &hex!(
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
);

/// SHA-256 of `"abc"` (FIPS 180-2, B.1).
pub const ABC_SHA256: &[u8; 32] = &hex!(
    "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
);

/// The 448-bit message of FIPS 180-2, B.2, whose padding spills into a
/// second block.
pub const TWO_BLOCK_TEXT: &[u8] =
    b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";

/// SHA-256 of [`TWO_BLOCK_TEXT`].
pub const TWO_BLOCK_SHA256: &[u8; 32] = &hex!(
    "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
);

/// SHA-256 of one million `'a'` bytes (FIPS 180-2, B.3).
pub const MILLION_A_SHA256: &[u8; 32] = &hex!(
    "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0"
);

/// SHA-256 of [`pattern()`] at lengths around the padding and block
/// boundaries.
pub const PATTERN_SHA256: &[(usize, &[u8; 32])] = &[
    (0, &hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")),
    (3, &hex!("6ab0dba1f4f1dfbb37b4f9eeb092c09fca4900ad32bdcd147d8dde35d6c87c35")),
    (55, &hex!("e7313d333c272e639f790978283f9eb392e843d0f29b7016828bb1daa4aac70b")),
    (56, &hex!("4324d65f3c103567f5589c710bc08f8523f929a9272e3af36fc968e52abc6c27")),
    (63, &hex!("81c80242132f230c3bd41b3e63bbcff16107339549214a99614ff26664625055")),
    (64, &hex!("39e3d7b6b5d075d37d053ad89b24b41bef4f3c29760c84447cab3f3be1882241")),
    (65, &hex!("aacca6ff74fdbb296d165a45cecfa04e5127bc008770fbbdd48006f2d2fae95e")),
    (119, &hex!("9ce7368e4daf32341631b492e80359dc9f594b48453cd0dd5bf0b19279cc177e")),
    (120, &hex!("7836b787757e95e58b3ca5aec90b1b004e8deba1e50e9675af9cabf1a13a04b5")),
    (200, &hex!("2c7e18c942ef065b526a2d4e5546283749cd3ddfb51d8fc71f42717363685f46")),
];

/// The HMAC key used by [`HMAC256`]: `00 01 02 .. 0f`.
pub const HMAC_KEY: &[u8; 16] = &hex!("000102030405060708090a0b0c0d0e0f");

/// Returns the `len`-byte message used by [`HMAC256`]:
/// `msg[i] = 0x80 + i (mod 256)`.
pub fn hmac_message(len: usize) -> Vec<u8> {
    (0..len).map(|i| (0x80 + i) as u8).collect()
}

/// HMAC-SHA256 under [`HMAC_KEY`] of [`hmac_message()`] at lengths that
/// straddle the hash block size.
pub const HMAC256: &[(usize, &[u8; 32])] = &[
    (0, &hex!("07eff8b326b7798c9ccfcbdbe579489ac785a7995a04618b1a2813c26744777d")),
    (1, &hex!("b77379bab8f8ae99854a5a13a598b0afc1592ebfe7962d4f8dbd1ab583099dbf")),
    (64, &hex!("d6f91510ca80c4339a25692bd004ed8326dfd140d6aa49e76c0bc1f75a57bc23")),
    (65, &hex!("1ceffa8bec2c5ea8754f9c88b4930b003f7a861ea27c8c3fe17d1490914882b8")),
];

/// AES-128 key of NIST SP 800-38A, F.2.1.
pub const CBC_KEY: &[u8; 16] = &hex!("2b7e151628aed2a6abf7158809cf4f3c");

/// IV of NIST SP 800-38A, F.2.1.
pub const CBC_IV: &[u8; 16] = &hex!("000102030405060708090a0b0c0d0e0f");

/// Plaintext of NIST SP 800-38A, F.2.1.
pub const CBC_PLAIN: &[u8; 64] = &hex!(
    "6bc1bee22e409f96e93d7e117393172a"
    "ae2d8a571e03ac9c9eb76fac45af8e51"
    "30c81c46a35ce411e5fbc1191a0a52ef"
    "f69f2445df4f9b17ad2b417be66c3710"
);

/// Ciphertext of NIST SP 800-38A, F.2.1.
pub const CBC_CIPHER: &[u8; 64] = &hex!(
    "7649abac8119b246cee98e9b12e9197d"
    "5086cb9b507219ee95db113a917678b2"
    "73bed6b8e3c1743b7116e69e22229516"
    "3ff1caa1681fac09120eca307586e1a7"
);
