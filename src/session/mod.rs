// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! SSCP session management.
//!
//! An SSCP session is established by a challenge-response exchange between
//! the host (`A`) and the reader (`B`): the host sends a random challenge
//! `RndA`, the reader answers with its own challenge `RndB`, and both sides
//! then run the same key derivation over the shared authentication key and
//! `RndB`. The result is four 128-bit keys, one cipher key and one MAC key
//! per direction; see [`kdf`] for the exact algorithm.
//!
//! The framing of the `Authenticate` exchange itself is not handled here;
//! [`Session`] only tracks where the host is in the handshake and owns the
//! resulting keys.

use crate::crypto::block;
use crate::crypto::csrng;
use crate::crypto::hash;
use crate::crypto::AuthKey;
use crate::crypto::Challenge;
use crate::crypto::SessionKey;
use crate::crypto::KEY_LEN;

use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

pub mod kdf;

/// An error returned by a session operation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates that one of the state-transitioning functions was called
    /// on an incorrect state.
    ///
    /// For example, [`Session::finish()`] can only be called after
    /// [`Session::begin()`] is called.
    BadStateTransition,
    /// Indicates that the block cipher failed during key derivation.
    Cipher(block::Error),
    /// Indicates that the hash engine failed during key derivation.
    Hash(hash::Error),
    /// Indicates that no challenge could be drawn.
    Rng(csrng::Error),
}

impl From<block::Error> for Error {
    fn from(e: block::Error) -> Self {
        Self::Cipher(e)
    }
}

impl From<hash::Error> for Error {
    fn from(e: hash::Error) -> Self {
        Self::Hash(e)
    }
}

impl From<csrng::Error> for Error {
    fn from(e: csrng::Error) -> Self {
        Self::Rng(e)
    }
}

/// The number of bytes of key material produced by [`kdf::derive()`].
pub const KEY_MATERIAL_LEN: usize = 4 * KEY_LEN;

/// The four keys of an authenticated session.
///
/// `AB` keys protect host-to-reader traffic, `BA` keys reader-to-host
/// traffic. All four are wiped when the value is dropped. The keys cannot
/// be cloned, so the only copy lives in the owning [`Session`].
#[derive(PartialEq, Eq, Debug, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    /// The host-to-reader cipher key.
    pub cipher_ab: SessionKey,
    /// The reader-to-host cipher key.
    pub cipher_ba: SessionKey,
    /// The host-to-reader MAC key.
    pub sign_ab: SessionKey,
    /// The reader-to-host MAC key.
    pub sign_ba: SessionKey,
}

impl SessionKeys {
    /// Splits 64 bytes of key material, in the order `CipherAB`, `CipherBA`,
    /// `SignAB`, `SignBA`.
    pub(crate) fn split(material: &[u8; KEY_MATERIAL_LEN]) -> Self {
        let key = |i: usize| {
            SessionKey::from_slice(&material[i * KEY_LEN..(i + 1) * KEY_LEN])
        };
        Self {
            cipher_ab: key(0),
            cipher_ba: key(1),
            sign_ab: key(2),
            sign_ba: key(3),
        }
    }
}

/// The host side of an SSCP session.
///
/// A `Session` is a state machine with three states:
/// 1.  "Inactive": the starting state, indicating no session.
///         - This state may be entered via [`Session::destroy()`] at any time.
///         - A failed [`Session::finish()`] also returns here.
/// 2.  "Challenged": a fresh `RndA` has been drawn, and the host is waiting
///     for the reader's `RndB`.
///         - This state may be entered via [`Session::begin()`] from any
///           state; beginning a new handshake on an active session wipes
///           its keys.
/// 3.  "Active": the keys have been derived, and [`Session::keys()`] returns
///     them.
///         - This state may be entered via [`Session::finish()`], but only
///           from the "Challenged" state.
///
/// Failed transitions leave the `Session` as-is, except for
/// [`Session::finish()`]: a challenge is good for one attempt only.
pub struct Session {
    state: State,
    options: kdf::Options,
}

enum State {
    Inactive,
    Challenged {
        rnd_a: Challenge,
    },
    Active {
        rnd_a: Challenge,
        keys: SessionKeys,
    },
}

impl Session {
    /// Creates a new inactive `Session`.
    pub fn new() -> Self {
        Self::with_options(kdf::Options::default())
    }

    /// Creates a new inactive `Session` that derives keys with `options`.
    pub fn with_options(options: kdf::Options) -> Self {
        Self {
            state: State::Inactive,
            options,
        }
    }

    /// Begins a new handshake, returning the host challenge `RndA` to send to
    /// the reader.
    ///
    /// This function destroys any prior existing session.
    pub fn begin(
        &mut self,
        rng: &mut dyn csrng::Csrng,
    ) -> Result<Challenge, Error> {
        let rnd_a = Challenge::random(rng)?;
        if self.is_active() {
            info!("re-authenticating; discarding active session keys");
        }
        self.state = State::Challenged { rnd_a };
        Ok(rnd_a)
    }

    /// Completes the handshake with the reader's challenge `RndB`, deriving
    /// the session keys.
    pub fn finish(
        &mut self,
        cipher: &mut dyn block::Cipher,
        hash: &mut dyn hash::Engine,
        auth_key: &AuthKey,
        rnd_b: &Challenge,
    ) -> Result<(), Error> {
        let rnd_a = match &self.state {
            State::Challenged { rnd_a } => *rnd_a,
            _ => return Err(fail!(Error::BadStateTransition)),
        };
        self.state = State::Inactive;

        let keys =
            kdf::derive(cipher, hash, auth_key, &rnd_a, rnd_b, self.options)?;
        self.state = State::Active { rnd_a, keys };
        Ok(())
    }

    /// Destroys the session, wiping its keys.
    pub fn destroy(&mut self) {
        self.state = State::Inactive;
    }

    /// Returns whether a session has been established.
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// Returns the host challenge of the current handshake or session, if
    /// there is one.
    pub fn rnd_a(&self) -> Option<&Challenge> {
        match &self.state {
            State::Inactive => None,
            State::Challenged { rnd_a } | State::Active { rnd_a, .. } => {
                Some(rnd_a)
            }
        }
    }

    /// Returns the current session's keys, if a session exists.
    pub fn keys(&self) -> Option<&SessionKeys> {
        match &self.state {
            State::Active { keys, .. } => Some(keys),
            _ => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
