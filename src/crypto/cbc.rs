// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Cipher-block chaining over a [`block::Cipher`].
//!
//! SSCP frames are padded by the framing layer, so CBC here never pads:
//! buffers must be a whole number of blocks, and are transformed in place.

use crate::crypto::block;
use crate::crypto::Block;
use crate::crypto::Key;
use crate::crypto::BLOCK_LEN;

/// An error returned by a CBC operation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that the buffer is not a whole number of blocks. The buffer
    /// is left untouched.
    InvalidLength,
    /// Indicates that the underlying cipher failed.
    Cipher(block::Error),
}

impl From<block::Error> for Error {
    fn from(e: block::Error) -> Self {
        Self::Cipher(e)
    }
}

/// Encrypts `buf` in place under `key`, chaining from `iv`.
///
/// On failure, the contents of `buf` are unspecified, unless the error is
/// [`Error::InvalidLength`].
pub fn encrypt(
    cipher: &mut dyn block::Cipher,
    key: &Key,
    iv: &Block,
    buf: &mut [u8],
) -> Result<(), Error> {
    check!(buf.len() % BLOCK_LEN == 0, Error::InvalidLength);
    cipher.set_key(key)?;

    let mut chain = *iv;
    for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
        for (c, x) in chain.iter_mut().zip(chunk.iter()) {
            *c ^= x;
        }
        cipher.encrypt(&mut chain)?;
        chunk.copy_from_slice(&chain);
    }
    Ok(())
}

/// Decrypts `buf` in place under `key`, chaining from `iv`.
///
/// On failure, the contents of `buf` are unspecified, unless the error is
/// [`Error::InvalidLength`].
pub fn decrypt(
    cipher: &mut dyn block::Cipher,
    key: &Key,
    iv: &Block,
    buf: &mut [u8],
) -> Result<(), Error> {
    check!(buf.len() % BLOCK_LEN == 0, Error::InvalidLength);
    cipher.set_key(key)?;

    let mut chain = *iv;
    for chunk in buf.chunks_exact_mut(BLOCK_LEN) {
        let mut block = Block::default();
        block.copy_from_slice(chunk);
        let next_chain = block;

        cipher.decrypt(&mut block)?;
        let xored = block.iter().zip(chain.iter()).map(|(b, c)| b ^ c);
        for (out, x) in chunk.iter_mut().zip(xored) {
            *out = x;
        }
        chain = next_chain;
    }
    Ok(())
}

#[cfg(all(test, feature = "aes"))]
mod test {
    use super::*;
    use crate::crypto::aes;
    use pretty_assertions::assert_eq;
    use testutil::data::misc_crypto;

    #[test]
    fn nist_vector() {
        let mut cipher = aes::Cipher::new();
        let (key, iv) = (misc_crypto::CBC_KEY, misc_crypto::CBC_IV);
        let mut buf = *misc_crypto::CBC_PLAIN;
        encrypt(&mut cipher, key, iv, &mut buf).unwrap();
        assert_eq!(&buf, misc_crypto::CBC_CIPHER);

        decrypt(&mut cipher, key, iv, &mut buf).unwrap();
        assert_eq!(&buf, misc_crypto::CBC_PLAIN);
    }

    #[test]
    fn round_trip() {
        let mut cipher = aes::Cipher::new();
        for blocks in 1..=8 {
            let plain = misc_crypto::pattern(blocks * BLOCK_LEN);
            let key = [blocks as u8; 16];
            let iv = [!(blocks as u8); 16];

            let mut buf = plain.clone();
            encrypt(&mut cipher, &key, &iv, &mut buf).unwrap();
            assert_ne!(buf, plain);
            decrypt(&mut cipher, &key, &iv, &mut buf).unwrap();
            assert_eq!(buf, plain);
        }
    }

    #[test]
    fn chaining_hides_repeated_blocks() {
        let mut cipher = aes::Cipher::new();
        let mut buf = [0x42; 3 * BLOCK_LEN];
        encrypt(&mut cipher, &[1; 16], &[2; 16], &mut buf).unwrap();
        assert_ne!(buf[..16], buf[16..32]);
        assert_ne!(buf[16..32], buf[32..]);
    }

    #[test]
    fn wrong_iv_only_garbles_first_block() {
        let mut cipher = aes::Cipher::new();
        let mut buf = *misc_crypto::CBC_CIPHER;
        decrypt(&mut cipher, misc_crypto::CBC_KEY, &[0; 16], &mut buf).unwrap();
        assert_ne!(buf[..16], misc_crypto::CBC_PLAIN[..16]);
        assert_eq!(&buf[16..], &misc_crypto::CBC_PLAIN[16..]);
    }

    #[test]
    fn bad_length_is_rejected_untouched() {
        let mut cipher = aes::Cipher::new();
        for &len in &[1, 15, 17, 31, 33, 63] {
            let orig = misc_crypto::pattern(len);
            let mut buf = orig.clone();
            assert_eq!(
                encrypt(&mut cipher, &[0; 16], &[0; 16], &mut buf),
                Err(Error::InvalidLength)
            );
            assert_eq!(buf, orig);
            assert_eq!(
                decrypt(&mut cipher, &[0; 16], &[0; 16], &mut buf),
                Err(Error::InvalidLength)
            );
            assert_eq!(buf, orig);
        }
    }

    #[test]
    fn empty_buffer_is_accepted() {
        let mut cipher = aes::Cipher::new();
        let mut buf = [0u8; 0];
        encrypt(&mut cipher, &[0; 16], &[0; 16], &mut buf).unwrap();
        decrypt(&mut cipher, &[0; 16], &[0; 16], &mut buf).unwrap();
    }
}
