// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Connections to SSCP readers.
//!
//! A [`Reader`] ties together everything the host keeps per connected
//! device: the serial [`Channel`], the authenticated [`Session`], and the
//! cryptographic capabilities used to establish it. Command framing is
//! built on top of a `Reader`: it sends and receives frames through
//! [`Reader::channel_mut()`], and drives authentication with
//! [`Reader::begin_authentication()`] and
//! [`Reader::complete_authentication()`].

use core::convert::TryFrom;
use std::time::Instant;

use crate::crypto::block;
use crate::crypto::csrng;
use crate::crypto::hash;
use crate::crypto::AuthKey;
use crate::crypto::Challenge;
use crate::serial::Backend;
use crate::serial::BaudRate;
use crate::serial::Channel;
use crate::serial::CommFlags;
use crate::serial::Statistics;
use crate::serial::System;
use crate::serial::Timeouts;
use crate::session::Session;
use crate::Error;

/// The cryptographic capabilities a [`Reader`] authenticates with.
pub struct Crypto {
    /// Source of host challenges.
    pub rng: Box<dyn csrng::Csrng + Send>,
    /// AES-128.
    pub cipher: Box<dyn block::Cipher + Send>,
    /// SHA-256.
    pub hash: Box<dyn hash::Engine + Send>,
}

#[cfg(all(feature = "ring", feature = "aes"))]
impl Default for Crypto {
    /// OS randomness, RustCrypto AES, and this crate's SHA-256.
    fn default() -> Self {
        Self {
            rng: Box::new(crate::crypto::ring::csrng::Csrng::new()),
            cipher: Box::new(crate::crypto::aes::Cipher::new()),
            hash: Box::new(crate::crypto::soft::hash::Engine::new()),
        }
    }
}

/// A connection to one SSCP reader.
pub struct Reader<B: Backend = System> {
    channel: Channel<B>,
    session: Session,
    crypto: Crypto,
    session_count: u32,
    session_start: Option<Instant>,
    session_counter: u32,
}

impl<B: Backend> Reader<B> {
    /// Creates a new, disconnected `Reader`.
    pub fn new(crypto: Crypto) -> Self {
        Self::with_session(crypto, Session::new())
    }

    /// Creates a new, disconnected `Reader` that uses `session`, e.g. one
    /// created with [`Session::with_options()`].
    pub fn with_session(crypto: Crypto, session: Session) -> Self {
        Self {
            channel: Channel::new(),
            session,
            crypto,
            session_count: 0,
            session_start: None,
            session_counter: 0,
        }
    }

    /// Connects to the reader on serial device `name`.
    ///
    /// Opens the device, sets it to `baud` bps, and resets timeouts to the
    /// defaults. If configuration fails, the device is closed again. Any
    /// previous connection and session are torn down first.
    pub fn open(
        &mut self,
        name: &str,
        baud: u32,
        flags: CommFlags,
    ) -> Result<(), Error> {
        let baud = BaudRate::try_from(baud)?;
        self.end_session();
        self.session_count = 0;

        self.channel.open(name, flags)?;
        let configured = self
            .channel
            .configure(baud)
            .and_then(|_| self.channel.set_timeouts(Timeouts::default()));
        if let Err(e) = configured {
            let _ = self.channel.close();
            return Err(e);
        }
        info!("connected to {} at {} bps", name, baud);
        Ok(())
    }

    /// Disconnects from the reader, destroying any session.
    ///
    /// Returns [`Error::CommNotOpen`] if nothing was connected.
    pub fn close(&mut self) -> Result<(), Error> {
        self.end_session();
        self.channel.close()
    }

    fn end_session(&mut self) {
        self.session.destroy();
        self.session_start = None;
        self.session_counter = 0;
    }

    /// Returns the serial channel.
    pub fn channel(&self) -> &Channel<B> {
        &self.channel
    }

    /// Returns the serial channel, for sending and receiving frames.
    pub fn channel_mut(&mut self) -> &mut Channel<B> {
        &mut self.channel
    }

    /// Returns the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Starts authentication, returning the host challenge `RndA` to send
    /// in the `Authenticate` command.
    ///
    /// Any existing session is destroyed.
    pub fn begin_authentication(&mut self) -> Result<Challenge, Error> {
        check!(self.channel.is_open(), Error::CommNotOpen);
        self.end_session();
        Ok(self.session.begin(&mut *self.crypto.rng)?)
    }

    /// Completes authentication with the reader challenge `RndB` from the
    /// `Authenticate` reply, establishing the session keys.
    pub fn complete_authentication(
        &mut self,
        auth_key: &AuthKey,
        rnd_b: &Challenge,
    ) -> Result<(), Error> {
        check!(self.channel.is_open(), Error::CommNotOpen);
        self.session.finish(
            &mut *self.crypto.cipher,
            &mut *self.crypto.hash,
            auth_key,
            rnd_b,
        )?;

        self.session_count = self.session_count.wrapping_add(1);
        self.session_start = Some(Instant::now());
        self.session_counter = 0;
        info!("session {} established", self.session_count);
        Ok(())
    }

    /// Advances the message counter of the current session, returning the
    /// new value.
    pub fn next_session_counter(&mut self) -> Result<u32, Error> {
        check!(self.session.is_active(), Error::InvalidContext);
        self.session_counter = self.session_counter.wrapping_add(1);
        Ok(self.session_counter)
    }

    /// Returns the link and session statistics.
    pub fn statistics(&self) -> Statistics {
        let session_time = self
            .session_start
            .map(|t| u32::try_from(t.elapsed().as_millis()).unwrap_or(u32::MAX))
            .unwrap_or(0);
        Statistics {
            session_count: self.session_count,
            session_time,
            session_counter: self.session_counter,
            ..self.channel.statistics()
        }
    }
}

#[cfg(all(test, feature = "aes"))]
mod test {
    use super::*;
    use crate::crypto::aes;
    use crate::crypto::csrng::fake::Counter;
    use crate::crypto::soft;
    use crate::serial::fake::Fake;
    use crate::serial::fake::Script;
    use crate::serial::State;
    use pretty_assertions::assert_eq;
    use testutil::data::session as vectors;

    fn reader() -> Reader<Fake> {
        Reader::new(Crypto {
            rng: Box::new(Counter(0)),
            cipher: Box::new(aes::Cipher::new()),
            hash: Box::new(soft::hash::Engine::new()),
        })
    }

    fn authenticate(r: &mut Reader<Fake>) {
        let rnd_a = r.begin_authentication().unwrap();
        assert_eq!(r.session().rnd_a(), Some(&rnd_a));
        r.complete_authentication(
            &AuthKey::new(vectors::AUTH_KEY),
            &Challenge::new(vectors::RND_B),
        )
        .unwrap();
    }

    #[test]
    fn open_and_close() {
        let mut r = reader();
        r.open(&Script::new().install(), 38400, CommFlags::empty())
            .unwrap();
        assert_eq!(r.channel().state(), State::Configured);
        assert_eq!(r.channel().baud_rate(), Some(BaudRate::B38400));
        assert_eq!(r.channel().timeouts(), Timeouts::default());

        r.close().unwrap();
        assert_eq!(r.channel().state(), State::Closed);
        assert_eq!(r.close(), Err(Error::CommNotOpen));
    }

    #[test]
    fn bad_baud_rate_is_rejected_up_front() {
        let script = Script::new();
        let log = script.log();
        let name = script.install();

        let mut r = reader();
        assert_eq!(
            r.open(&name, 57600, CommFlags::empty()),
            Err(Error::InvalidParameter)
        );
        assert_eq!(r.channel().state(), State::Closed);
        assert_eq!(log.borrow().flushes, 0);
    }

    #[test]
    fn configure_failure_closes() {
        let script = Script::new().reject_configure();
        let log = script.log();

        let mut r = reader();
        assert_eq!(
            r.open(&script.install(), 9600, CommFlags::empty()),
            Err(Error::CommControlFailed)
        );
        assert_eq!(r.channel().state(), State::Closed);
        assert!(log.borrow().closed);
    }

    #[test]
    fn authentication() {
        let mut r = reader();
        assert_eq!(r.begin_authentication(), Err(Error::CommNotOpen));

        r.open(&Script::new().install(), 115200, CommFlags::empty())
            .unwrap();
        assert_eq!(
            r.complete_authentication(
                &AuthKey::new(vectors::AUTH_KEY),
                &Challenge::new(vectors::RND_B),
            ),
            Err(Error::InvalidContext)
        );

        authenticate(&mut r);
        let keys = r.session().keys().unwrap();
        assert_eq!(keys.sign_ab.as_bytes(), &vectors::KEY_MATERIAL[32..48]);

        r.close().unwrap();
        assert!(!r.session().is_active());
    }

    #[test]
    fn session_statistics() {
        let mut r = reader();
        let port = Script::new().reply(b"ok").install();
        r.open(&port, 115200, CommFlags::empty()).unwrap();
        assert_eq!(r.next_session_counter(), Err(Error::InvalidContext));

        authenticate(&mut r);
        assert_eq!(r.next_session_counter(), Ok(1));
        assert_eq!(r.next_session_counter(), Ok(2));
        r.channel_mut().send(b"cmd").unwrap();
        r.channel_mut().recv(&mut [0u8; 2]).unwrap();

        let stats = r.statistics();
        assert_eq!(stats.session_count, 1);
        assert_eq!(stats.session_counter, 2);
        assert_eq!(stats.bytes_sent, 3);
        assert_eq!(stats.bytes_received, 2);

        authenticate(&mut r);
        let stats = r.statistics();
        assert_eq!(stats.session_count, 2);
        assert_eq!(stats.session_counter, 0);

        r.open(&Script::new().install(), 115200, CommFlags::empty())
            .unwrap();
        assert_eq!(r.statistics(), Statistics::default());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn statistics_serialize() {
        let stats = Statistics {
            bytes_sent: 3,
            ..Statistics::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["bytes_sent"], 3);
        assert_eq!(json["session_count"], 0);
    }
}
