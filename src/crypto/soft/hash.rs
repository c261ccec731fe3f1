// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! An implementation of [`hash::Engine`] based on [`sha256`] and [`hmac`].

use core::mem;

use crate::crypto::hash;
use crate::crypto::hmac::Hmac256;
use crate::crypto::sha256::Sha256;
use crate::crypto::Digest;
use crate::crypto::Key;

/// A software [`hash::Engine`].
#[derive(Default)]
pub struct Engine {
    inner: Inner,
}

enum Inner {
    Idle,
    Hash(Sha256),
    Hmac(Hmac256),
}

impl Default for Inner {
    fn default() -> Self {
        Self::Idle
    }
}

impl Engine {
    /// Creates a new, idle `Engine`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl hash::Engine for Engine {
    fn start_raw(&mut self, key: Option<&Key>) -> Result<(), hash::Error> {
        self.inner = match key {
            Some(k) => Inner::Hmac(Hmac256::new(k)),
            None => Inner::Hash(Sha256::new()),
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
        match mem::take(&mut self.inner) {
            Inner::Idle => return Err(fail!(hash::Error::Idle)),
            Inner::Hash(c) => c.finish(out),
            Inner::Hmac(c) => c.finish(out),
        }
        Ok(())
    }

    fn compare_raw(&mut self, expected: &Digest) -> Result<(), hash::Error> {
        let ok = match mem::take(&mut self.inner) {
            Inner::Idle => return Err(fail!(hash::Error::Idle)),
            Inner::Hash(c) => {
                let mut digest = Digest::default();
                c.finish(&mut digest);
                &digest == expected
            }
            Inner::Hmac(c) => c.verify(expected),
        };
        check!(ok, hash::Error::Unspecified);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::hash::Engine as _;
    use crate::crypto::hash::EngineExt as _;
    use pretty_assertions::assert_eq;
    use testutil::data::misc_crypto;

    #[test]
    fn hash256() {
        let mut e = Engine::new();
        let mut digest = Digest::default();

        let mut ctx = e.new_hash().unwrap();
        ctx.write(misc_crypto::TWO_BLOCK_TEXT).unwrap();
        ctx.finish(&mut digest).unwrap();
        assert_eq!(&digest, misc_crypto::TWO_BLOCK_SHA256);

        let mut ctx = e.new_hash().unwrap();
        ctx.write(&misc_crypto::TWO_BLOCK_TEXT[..16]).unwrap();
        ctx.write(&misc_crypto::TWO_BLOCK_TEXT[16..]).unwrap();
        ctx.expect(misc_crypto::TWO_BLOCK_SHA256).unwrap();
    }

    #[test]
    fn hmac256() {
        for &(len, expected) in misc_crypto::HMAC256 {
            let msg = misc_crypto::hmac_message(len);
            let mut e = Engine::new();

            let mut tag = Digest::default();
            e.contiguous_hmac(misc_crypto::HMAC_KEY, &msg, &mut tag)
                .unwrap();
            assert_eq!(&tag, expected, "len = {}", len);

            let mut ctx = e.new_hmac(misc_crypto::HMAC_KEY).unwrap();
            ctx.write(&msg).unwrap();
            ctx.expect(expected).unwrap();
        }
    }

    #[test]
    fn mismatch() {
        let mut e = Engine::new();
        let mut wrong = *misc_crypto::EMPTY_SHA256;
        wrong[0] ^= 1;
        let ctx = e.new_hash().unwrap();
        assert_eq!(ctx.expect(&wrong), Err(hash::Error::Unspecified));

        let ctx = e.new_hmac(misc_crypto::HMAC_KEY).unwrap();
        assert_eq!(ctx.expect(&wrong), Err(hash::Error::Unspecified));
    }

    #[test]
    fn idle() {
        let mut e = Engine::new();
        let mut digest = Digest::default();
        assert_eq!(e.write_raw(b"x"), Err(hash::Error::Idle));
        assert_eq!(e.finish_raw(&mut digest), Err(hash::Error::Idle));

        e.contiguous_hash(b"abc", &mut digest).unwrap();
        assert_eq!(&digest, misc_crypto::ABC_SHA256);
        assert_eq!(e.finish_raw(&mut digest), Err(hash::Error::Idle));
    }
}
