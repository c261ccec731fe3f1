// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! SSCP session-key derivation.
//!
//! # Algorithm
//!
//! Given the authentication key `K` and the reader challenge `RndB`, and
//! writing `E(k, x)` for AES-128 encryption of the single block `x` under
//! `k`:
//!
//! ```text
//! K'     := E(K, K)
//! W      := E(K', RndB)
//! Block1 := 00000000 || W || 026A5382E653
//! Block2 := 00000001 || W || 026A
//! T      := SHA-256(Block1) || SHA-256(Block2)
//!
//! CipherAB := T[0..16]
//! CipherBA := T[16..32]
//! SignAB   := T[32..48]
//! SignBA   := T[48..64]
//! ```
//!
//! The host challenge `RndA` does not enter the derivation, even though it
//! is part of the handshake. Reader firmware computes the keys this way, so
//! [`derive()`] does too; it still accepts `RndA`, so that callers need not
//! change if that is ever fixed on the device side.

use zeroize::Zeroize as _;

use crate::crypto::block;
use crate::crypto::block::CipherExt as _;
use crate::crypto::hash;
use crate::crypto::hash::EngineExt as _;
use crate::crypto::AuthKey;
use crate::crypto::Block;
use crate::crypto::Challenge;
use crate::crypto::Digest;
use crate::crypto::DIGEST_LEN;
use crate::session::Error;
use crate::session::SessionKeys;
use crate::session::KEY_MATERIAL_LEN;

use crate::debug::Hex;

/// Fixed trailer of the first hashed block.
const BLOCK1_SUFFIX: [u8; 6] = [0x02, 0x6a, 0x53, 0x82, 0xe6, 0x53];

/// Fixed trailer of the second hashed block.
const BLOCK2_SUFFIX: [u8; 2] = [0x02, 0x6a];

/// Options for [`derive()`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Options {
    /// Whether to log every intermediate value, and the resulting keys, at
    /// trace level.
    ///
    /// This exposes session secrets (though never the authentication key) to
    /// the log, and is meant for bring-up against new reader firmware only.
    pub trace: bool,
}

fn dump(opts: &Options, label: &str, bytes: &[u8]) {
    if opts.trace {
        trace!("kdf: {} = {}", label, Hex(bytes));
    }
}

/// Builds `counter || w || suffix` into `out`, returning the used prefix.
fn hash_input<'a>(
    out: &'a mut [u8; 26],
    counter: u32,
    w: &Block,
    suffix: &[u8],
) -> &'a [u8] {
    let len = 4 + w.len() + suffix.len();
    out[..4].copy_from_slice(&counter.to_be_bytes());
    out[4..20].copy_from_slice(w);
    out[20..len].copy_from_slice(suffix);
    &out[..len]
}

/// Hashes the two blocks built around `w` into `material`.
fn expand(
    hash: &mut dyn hash::Engine,
    w: &Block,
    opts: &Options,
    material: &mut [u8; KEY_MATERIAL_LEN],
) -> Result<(), hash::Error> {
    let mut scratch = [0u8; 26];
    let mut digest = Digest::default();
    let (t1, t2) = material.split_at_mut(DIGEST_LEN);

    let block1 = hash_input(&mut scratch, 0, w, &BLOCK1_SUFFIX);
    dump(opts, "Block1", block1);
    let result = hash.contiguous_hash(block1, &mut digest);
    t1.copy_from_slice(&digest);

    let result = result.and_then(|_| {
        let block2 = hash_input(&mut scratch, 1, w, &BLOCK2_SUFFIX);
        dump(opts, "Block2", block2);
        hash.contiguous_hash(block2, &mut digest)
    });
    t2.copy_from_slice(&digest);

    scratch.zeroize();
    digest.zeroize();
    result
}

/// Derives the four session keys from `auth_key` and the reader challenge
/// `rnd_b`.
///
/// `cipher` must be AES-128; it is left keyed with an intermediate secret,
/// so callers should not share it with untrusted code. `hash` must be
/// SHA-256. See the [module documentation][self] for the algorithm, and for
/// why `rnd_a` is unused.
pub fn derive(
    cipher: &mut dyn block::Cipher,
    hash: &mut dyn hash::Engine,
    auth_key: &AuthKey,
    rnd_a: &Challenge,
    rnd_b: &Challenge,
    opts: Options,
) -> Result<SessionKeys, Error> {
    dump(&opts, "RndA (unused)", rnd_a.as_bytes());
    dump(&opts, "RndB", rnd_b.as_bytes());

    let mut whitened = *auth_key.expose();
    cipher.encrypt_with(auth_key.expose(), &mut whitened)?;
    dump(&opts, "K'", &whitened);

    let mut w = *rnd_b.as_bytes();
    let result = cipher.encrypt_with(&whitened, &mut w);
    whitened.zeroize();
    result?;
    dump(&opts, "W", &w);

    let mut material = [0u8; KEY_MATERIAL_LEN];
    let result = expand(hash, &w, &opts, &mut material);
    w.zeroize();
    if let Err(e) = result {
        material.zeroize();
        return Err(e.into());
    }
    dump(&opts, "T", &material);

    let keys = SessionKeys::split(&material);
    material.zeroize();
    dump(&opts, "CipherAB", keys.cipher_ab.as_bytes());
    dump(&opts, "CipherBA", keys.cipher_ba.as_bytes());
    dump(&opts, "SignAB", keys.sign_ab.as_bytes());
    dump(&opts, "SignBA", keys.sign_ba.as_bytes());
    Ok(keys)
}
