// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! HMAC-SHA256 (RFC 2104), restricted to 128-bit keys.
//!
//! Since an SSCP key is always shorter than the SHA-256 block, it is used
//! as-is, zero-extended to the block size; there is no key-hashing path.

use core::mem;

use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

use crate::crypto::sha256::Sha256;
use crate::crypto::sha256::BLOCK_LEN;
use crate::crypto::Digest;
use crate::crypto::Key;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Builds a 64-byte pad block: `byte` repeated, with `key` XORed into the
/// front.
fn pad(key: &Key, byte: u8) -> [u8; BLOCK_LEN] {
    let mut pad = [byte; BLOCK_LEN];
    for (p, k) in pad.iter_mut().zip(key.iter()) {
        *p ^= k;
    }
    pad
}

/// Computes the HMAC-SHA256 of `message` under `key`.
pub fn hmac(key: &Key, message: &[u8]) -> Digest {
    let mut out = Digest::default();
    let mut mac = Hmac256::new(key);
    mac.update(message);
    mac.finish(&mut out);
    out
}

/// A streaming HMAC-SHA256 computation.
///
/// The key and the keyed inner hash state are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Hmac256 {
    inner: Sha256,
    key: Key,
}

impl Hmac256 {
    /// Starts a new MAC computation under `key`.
    pub fn new(key: &Key) -> Self {
        let mut inner = Sha256::new();
        let mut ipad = pad(key, IPAD);
        inner.update(&ipad);
        ipad.zeroize();
        Self { inner, key: *key }
    }

    /// Adds `data` to the message.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Completes the computation, writing the tag to `out`.
    pub fn finish(mut self, out: &mut Digest) {
        let mut inner_digest = Digest::default();
        mem::take(&mut self.inner).finish(&mut inner_digest);

        let mut opad = pad(&self.key, OPAD);
        let mut outer = Sha256::new();
        outer.update(&opad);
        outer.update(&inner_digest);
        outer.finish(out);

        opad.zeroize();
        inner_digest.zeroize();
    }

    /// Completes the computation, and compares the tag to `expected` in
    /// constant time.
    pub fn verify(self, expected: &Digest) -> bool {
        let mut tag = Digest::default();
        self.finish(&mut tag);
        let diff = tag
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        diff == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use testutil::data::misc_crypto;

    #[test]
    fn vectors() {
        for &(len, expected) in misc_crypto::HMAC256 {
            let msg = misc_crypto::hmac_message(len);
            assert_eq!(
                &hmac(misc_crypto::HMAC_KEY, &msg),
                expected,
                "len = {}",
                len
            );
        }
    }

    #[test]
    fn streaming_matches_one_shot() {
        let msg = misc_crypto::hmac_message(65);
        let expected = hmac(misc_crypto::HMAC_KEY, &msg);
        for split in &[0, 1, 16, 63, 64, 65] {
            let mut mac = Hmac256::new(misc_crypto::HMAC_KEY);
            mac.update(&msg[..*split]);
            mac.update(&msg[*split..]);
            let mut tag = Digest::default();
            mac.finish(&mut tag);
            assert_eq!(tag, expected, "split = {}", split);
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn agrees_with_ring() {
        let key = [0x0bu8; 16];
        let ring_key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, &key);
        for len in 0..150 {
            let msg = misc_crypto::pattern(len);
            let theirs = ring::hmac::sign(&ring_key, &msg);
            assert_eq!(&hmac(&key, &msg)[..], theirs.as_ref(), "len = {}", len);
        }
    }

    #[test]
    fn zeroize_wipes_keyed_state() {
        let mut mac = Hmac256::new(misc_crypto::HMAC_KEY);
        mac.update(b"sscp frame");
        assert!(!mac.inner.is_zero());

        mac.zeroize();
        assert!(mac.inner.is_zero());
        assert_eq!(mac.key, [0; 16]);
    }

    #[test]
    fn verify() {
        let msg = b"sscp frame";
        let mut tag = hmac(misc_crypto::HMAC_KEY, msg);

        let mut mac = Hmac256::new(misc_crypto::HMAC_KEY);
        mac.update(msg);
        assert!(mac.verify(&tag));

        tag[31] ^= 0x01;
        let mut mac = Hmac256::new(misc_crypto::HMAC_KEY);
        mac.update(msg);
        assert!(!mac.verify(&tag));
    }
}
