// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! An implementation of [`block::Cipher`] based on the RustCrypto [`aes`]
//! crate.
//!
//! The [`aes` warranty disclaimer] applies to this module as well.
//!
//! [`aes` warranty disclaimer]: https://github.com/RustCrypto/block-ciphers/tree/master/aes

use aes::cipher::generic_array::GenericArray;
use aes::cipher::BlockDecrypt as _;
use aes::cipher::BlockEncrypt as _;
use aes::cipher::KeyInit as _;
use aes::Aes128;

use crate::crypto::block;
use crate::crypto::Block;
use crate::crypto::Key;

/// An AES-128 [`block::Cipher`].
#[derive(Default)]
pub struct Cipher {
    inner: Option<Aes128>,
}

impl Cipher {
    /// Creates a new `Cipher` with no key installed.
    pub fn new() -> Self {
        Self::default()
    }

    fn keyed(&self) -> Result<&Aes128, block::Error> {
        self.inner.as_ref().ok_or_else(|| fail!(block::Error::NoKey))
    }
}

impl block::Cipher for Cipher {
    fn set_key(&mut self, key: &Key) -> Result<(), block::Error> {
        self.inner = Some(Aes128::new(GenericArray::from_slice(&key[..])));
        Ok(())
    }

    fn encrypt(&mut self, block: &mut Block) -> Result<(), block::Error> {
        self.keyed()?
            .encrypt_block(GenericArray::from_mut_slice(&mut block[..]));
        Ok(())
    }

    fn decrypt(&mut self, block: &mut Block) -> Result<(), block::Error> {
        self.keyed()?
            .decrypt_block(GenericArray::from_mut_slice(&mut block[..]));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::block::Cipher as _;
    use crate::crypto::block::CipherExt as _;
    use testutil::data::misc_crypto;

    // NIST SP 800-38A, F.1.1, first block.
    const ECB_PLAIN: Block = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11,
        0x73, 0x93, 0x17, 0x2a,
    ];
    const ECB_CIPHER: Block = [
        0x3a, 0xd7, 0x7b, 0xb4, 0x0d, 0x7a, 0x36, 0x60, 0xa8, 0x9e, 0xca, 0xf3,
        0x24, 0x66, 0xef, 0x97,
    ];

    #[test]
    fn known_answer() {
        let mut aes = Cipher::new();
        let mut block = ECB_PLAIN;
        aes.encrypt_with(misc_crypto::CBC_KEY, &mut block).unwrap();
        assert_eq!(block, ECB_CIPHER);

        aes.decrypt(&mut block).unwrap();
        assert_eq!(block, ECB_PLAIN);
    }

    #[test]
    fn no_key() {
        let mut aes = Cipher::new();
        let mut block = ECB_PLAIN;
        assert_eq!(aes.encrypt(&mut block), Err(block::Error::NoKey));
        assert_eq!(aes.decrypt(&mut block), Err(block::Error::NoKey));
        assert_eq!(block, ECB_PLAIN);
    }
}
