// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementations of [`crypto::hash`] based on `ring`.

use core::mem;

use ring::digest;
use ring::hmac;

use crate::crypto::hash;
use crate::crypto::Digest;
use crate::crypto::Key;

#[cfg(doc)]
use crate::crypto;

/// A `ring`-based [`hash::Engine`].
pub struct Engine {
    inner: Inner,
}

enum Inner {
    Idle,
    Hash(digest::Context),
    Hmac(hmac::Context),
}

impl Engine {
    /// Creates a new `Engine`.
    pub fn new() -> Self {
        Self { inner: Inner::Idle }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl hash::Engine for Engine {
    fn start_raw(&mut self, key: Option<&Key>) -> Result<(), hash::Error> {
        self.inner = match key {
            Some(k) => {
                let key = hmac::Key::new(hmac::HMAC_SHA256, k);
                Inner::Hmac(hmac::Context::with_key(&key))
            }
            None => Inner::Hash(digest::Context::new(&digest::SHA256)),
        };
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), hash::Error> {
        match &mut self.inner {
            Inner::Idle => return Err(fail!(hash::Error::Idle)),
            Inner::Hash(c) => c.update(data),
            Inner::Hmac(c) => c.update(data),
        }
        Ok(())
    }

    fn finish_raw(&mut self, out: &mut Digest) -> Result<(), hash::Error> {
        match mem::replace(&mut self.inner, Inner::Idle) {
            Inner::Idle => return Err(fail!(hash::Error::Idle)),
            Inner::Hash(c) => out.copy_from_slice(c.finish().as_ref()),
            Inner::Hmac(c) => out.copy_from_slice(c.sign().as_ref()),
        }
        Ok(())
    }

    fn compare_raw(&mut self, expected: &Digest) -> Result<(), hash::Error> {
        match mem::replace(&mut self.inner, Inner::Idle) {
            Inner::Idle => return Err(fail!(hash::Error::Idle)),
            Inner::Hash(c) => {
                let digest = c.finish();
                check!(digest.as_ref() == expected, hash::Error::Unspecified);
            }
            Inner::Hmac(c) => {
                let tag = c.sign();
                ring::constant_time::verify_slices_are_equal(
                    tag.as_ref(),
                    expected,
                )
                .map_err(|_| fail!(hash::Error::Unspecified))?;
            }
        }
        Ok(())
    }
}
