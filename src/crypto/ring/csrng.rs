// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementations of [`crypto::csrng`] based on `ring`.
//!
//! Requires the `std` feature flag to be enabled.
//!
//! `ring` draws from the operating system (`getrandom(2)`, falling back to
//! `/dev/urandom`, on Linux; `RtlGenRandom` on Windows). It retries on
//! interruption and never reports a partial fill as success.

use ring::rand::SecureRandom as _;
use ring::rand::SystemRandom;

use crate::crypto::csrng;

#[cfg(doc)]
use crate::crypto;

/// A [`csrng::Csrng`] backed by OS-supplied entropy.
pub struct Csrng {
    inner: SystemRandom,
}

impl Csrng {
    /// Creates a new entropy source.
    pub fn new() -> Self {
        Self {
            inner: SystemRandom::new(),
        }
    }
}

impl Default for Csrng {
    fn default() -> Self {
        Self::new()
    }
}

impl csrng::Csrng for Csrng {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), csrng::Error> {
        self.inner
            .fill(buf)
            .map_err(|_| fail!(csrng::Error::Unspecified))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::csrng::Csrng as _;
    use crate::crypto::Challenge;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn fills_whole_buffer() {
        let mut rng = Csrng::new();
        let mut buf = [0u8; 64];
        rng.fill(&mut buf).unwrap();
        // 2^-512 flake rate.
        assert_ne!(buf, [0u8; 64]);

        rng.fill(&mut [0u8; 0]).unwrap();
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn challenges_are_fresh() {
        let mut rng = Csrng::new();
        let a = Challenge::random(&mut rng).unwrap();
        let b = Challenge::random(&mut rng).unwrap();
        assert_ne!(a, b);
    }
}
