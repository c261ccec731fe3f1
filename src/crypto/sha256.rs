// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A software SHA-256, as specified in FIPS 180-4.
//!
//! [`Sha256`] is a streaming hasher: create one with [`Sha256::new()`], feed
//! it with any number of [`Sha256::update()`] calls, and consume it with
//! [`Sha256::finish()`]. Since `finish()` takes `self`, a hasher cannot be
//! reused without being re-initialized.
//!
//! The message length is tracked as a full 64-bit counter.

use byteorder::BigEndian;
use byteorder::ByteOrder as _;
use zeroize::Zeroize;

use crate::crypto::Digest;

/// The SHA-256 compression block length, in bytes.
pub const BLOCK_LEN: usize = 64;

/// Offset of the big-endian bit length within the final block.
const LEN_OFFSET: usize = BLOCK_LEN - 8;

const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c,
    0x1f83d9ab, 0x5be0cd19,
];

#[rustfmt::skip]
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

#[inline]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    z ^ (x & (y ^ z))
}

#[inline]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    ((x | y) & z) | (x & y)
}

#[inline]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Runs the compression function over one 64-byte block.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);

    let mut w = [0u32; 64];
    for (word, bytes) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = BigEndian::read_u32(bytes);
    }
    for i in 16..64 {
        w[i] = small_sigma1(w[i - 2])
            .wrapping_add(w[i - 7])
            .wrapping_add(small_sigma0(w[i - 15]))
            .wrapping_add(w[i - 16]);
    }

    let mut s = *state;
    for (&k, &wi) in K.iter().zip(w.iter()) {
        let [a, b, c, d, e, f, g, h] = s;
        let t0 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(k)
            .wrapping_add(wi);
        let t1 = big_sigma0(a).wrapping_add(maj(a, b, c));
        s = [t0.wrapping_add(t1), a, b, c, d.wrapping_add(t0), e, f, g];
    }

    for (x, y) in state.iter_mut().zip(s.iter()) {
        *x = x.wrapping_add(*y);
    }
}

/// A streaming SHA-256 hasher.
///
/// The working state is wiped by [`Sha256::finish()`]; a hasher dropped
/// before then keeps it until it is zeroized.
#[derive(Clone, Zeroize)]
pub struct Sha256 {
    state: [u32; 8],
    block: [u8; BLOCK_LEN],
    /// Number of bytes buffered in `block`.
    pending: usize,
    /// Total number of bytes absorbed, modulo 2^64.
    len: u64,
}

impl Sha256 {
    /// Creates a hasher in the standard initial state.
    pub fn new() -> Self {
        Self {
            state: H0,
            block: [0; BLOCK_LEN],
            pending: 0,
            len: 0,
        }
    }

    /// Hashes a contiguous buffer in one go.
    pub fn digest(data: &[u8]) -> Digest {
        let mut out = Digest::default();
        let mut h = Self::new();
        h.update(data);
        h.finish(&mut out);
        out
    }

    /// Absorbs `data` into the hash state.
    ///
    /// If the pending-block position is ever found beyond the block size,
    /// this function does nothing.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.pending > BLOCK_LEN {
            return;
        }
        self.len = self.len.wrapping_add(data.len() as u64);

        while !data.is_empty() {
            if self.pending == 0 && data.len() >= BLOCK_LEN {
                let (block, rest) = data.split_at(BLOCK_LEN);
                compress(&mut self.state, block);
                data = rest;
                continue;
            }

            let n = data.len().min(BLOCK_LEN - self.pending);
            self.block[self.pending..self.pending + n]
                .copy_from_slice(&data[..n]);
            self.pending += n;
            data = &data[n..];

            if self.pending == BLOCK_LEN {
                compress(&mut self.state, &self.block);
                self.pending = 0;
            }
        }
    }

    /// Pads the message, and writes the digest to `out`.
    ///
    /// If the pending-block position is ever found at or beyond the block
    /// size, `out` is left untouched.
    pub fn finish(mut self, out: &mut Digest) {
        if self.pending >= BLOCK_LEN {
            return;
        }
        let bit_len = self.len.wrapping_mul(8);

        self.block[self.pending] = 0x80;
        self.pending += 1;

        // No room left for the length; it goes into an extra block.
        if self.pending > LEN_OFFSET {
            self.block[self.pending..].fill(0);
            compress(&mut self.state, &self.block);
            self.pending = 0;
        }

        self.block[self.pending..LEN_OFFSET].fill(0);
        BigEndian::write_u64(&mut self.block[LEN_OFFSET..], bit_len);
        compress(&mut self.state, &self.block);

        for (bytes, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            BigEndian::write_u32(bytes, *word);
        }
        self.zeroize();
    }

    #[cfg(test)]
    pub(crate) fn is_zero(&self) -> bool {
        self.state.iter().all(|&w| w == 0)
            && self.block.iter().all(|&b| b == 0)
            && self.pending == 0
            && self.len == 0
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}
