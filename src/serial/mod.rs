// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Serial transport for SSCP.
//!
//! SSCP readers answer every command with a reply whose length the command
//! layer knows in advance, so the transport deals only in exact-length reads
//! and writes. What it adds on top of the platform's serial API is the
//! timeout policy the readers are designed around: a long wait for the first
//! byte of a reply (the reader may be busy with an NFC exchange), and then a
//! short wait between subsequent bytes (once a reply has started, it is sent
//! back-to-back).
//!
//! A stalled reply is classified by how far it got:
//! - nothing before the first-byte timeout is [`Error::CommRecvMute`];
//! - some bytes, then nothing for the inter-byte timeout, is
//!   [`Error::CommRecvStopped`].
//!
//! Neither is retried here. [`MAX_TIMEOUT_RETRY`] is the retry budget the
//! command layer should apply to them.
//!
//! # Layering
//!
//! [`Channel`] implements the connection state machine, chunking, timeout
//! policy, error classification and statistics once, on top of a [`Port`]:
//! a minimal primitive that can be configured, flushed, written, and read
//! with a timeout. A [`Backend`] opens ports by name; [`System`] is the
//! backend for the build target.

use core::convert::TryFrom;
use core::fmt;
use std::io;
use std::time::Duration;
use std::time::Instant;

use enumflags2::bitflags;
use enumflags2::BitFlags;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::debug::Hex;
use crate::Error;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

/// The serial backend for the current target.
#[cfg(unix)]
pub type System = unix::Unix;

/// The serial backend for the current target.
#[cfg(windows)]
pub type System = windows::Windows;

/// The number of times a command layer should re-send a command whose reply
/// timed out, before giving up.
///
/// [`Channel`] itself never retries.
pub const MAX_TIMEOUT_RETRY: u32 = 3;

/// A baud rate supported by SSCP readers.
///
/// Frames are always 8N1. Use [`BaudRate::try_from()`] to validate a raw
/// value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum BaudRate {
    /// 1200 bps.
    B1200,
    /// 2400 bps.
    B2400,
    /// 4800 bps.
    B4800,
    /// 9600 bps.
    B9600,
    /// 19200 bps.
    B19200,
    /// 38400 bps, the reader's factory setting.
    B38400,
    /// 115200 bps.
    B115200,
}

impl BaudRate {
    /// Every supported rate, slowest first.
    pub const ALL: [Self; 7] = [
        Self::B1200,
        Self::B2400,
        Self::B4800,
        Self::B9600,
        Self::B19200,
        Self::B38400,
        Self::B115200,
    ];

    /// Returns this rate in bits per second.
    pub const fn bps(self) -> u32 {
        match self {
            Self::B1200 => 1200,
            Self::B2400 => 2400,
            Self::B4800 => 4800,
            Self::B9600 => 9600,
            Self::B19200 => 19200,
            Self::B38400 => 38400,
            Self::B115200 => 115200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = Error;

    fn try_from(bps: u32) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.bps() == bps)
            .ok_or_else(|| {
                fail!(
                    Error::InvalidParameter,
                    "unsupported baud rate: {}",
                    bps
                )
            })
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.bps())
    }
}

/// A serial option flag.
#[bitflags]
#[repr(u32)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CommFlag {
    /// Do not discard pending input when opening or configuring the port.
    NoFlush = 0x0001,
    /// Use RTS/CTS hardware flow control.
    FlowControl = 0x0002,
}

/// A set of [`CommFlag`]s; the "flags" word of the SSCP host API.
pub type CommFlags = BitFlags<CommFlag>;

/// The two-tier receive timeout policy.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Timeouts {
    /// How long to wait for the first byte of a reply.
    pub first_byte: Duration,
    /// How long to wait for each subsequent byte.
    pub inter_byte: Duration,
}

impl Timeouts {
    /// The reader's nominal first-byte timeout.
    pub const FIRST_BYTE: Duration = Duration::from_millis(1000);
    /// The reader's nominal inter-byte timeout.
    pub const INTER_BYTE: Duration = Duration::from_millis(50);
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            first_byte: Self::FIRST_BYTE,
            inter_byte: Self::INTER_BYTE,
        }
    }
}

/// Link statistics.
///
/// The channel maintains the first four counters; [`crate::reader::Reader`]
/// fills in the session counters. All counters wrap on overflow.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Statistics {
    /// Milliseconds spent sending and receiving.
    pub total_time: u32,
    /// Number of failed sends and receives.
    pub total_errors: u32,
    /// Bytes written to the device.
    pub bytes_sent: u32,
    /// Bytes read from the device.
    pub bytes_received: u32,
    /// Number of sessions established.
    pub session_count: u32,
    /// Milliseconds since the current session was established.
    pub session_time: u32,
    /// The current session's message counter.
    pub session_counter: u32,
}

fn saturating_millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

/// A platform serial port, as used by [`Channel`].
///
/// Ports are opened by a [`Backend`], and closed when dropped.
pub trait Port {
    /// Sets the line to 8N1 at `baud`, honoring `flags`.
    fn configure(&mut self, baud: BaudRate, flags: CommFlags)
        -> io::Result<()>;

    /// Discards any input received but not yet read.
    fn flush_input(&mut self) -> io::Result<()>;

    /// Writes some prefix of `buf`, returning its length.
    ///
    /// Must not block indefinitely: if the line stops draining, the write
    /// returns what it got through, or an error if that was nothing.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Reads at least one and at most `buf.len()` bytes, waiting no longer
    /// than `timeout` for the first of them.
    ///
    /// Returns `Ok(0)` if the timeout elapsed with nothing to read.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Returns how many of `remaining` bytes to pass to a single
    /// [`Port::write()`].
    fn write_chunk(&self, remaining: usize) -> usize {
        remaining
    }

    /// Returns how many of `remaining` bytes to pass to a single
    /// [`Port::read()`].
    fn read_chunk(&self, remaining: usize) -> usize {
        remaining
    }
}

/// A source of [`Port`]s.
pub trait Backend {
    /// The port type this backend opens.
    type Port: Port;

    /// Opens the device `name` (such as `/dev/ttyUSB0` or `COM3`) for
    /// exclusive use.
    fn open(name: &str) -> io::Result<Self::Port>;
}

/// The state of a [`Channel`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum State {
    /// No device is open.
    Closed,
    /// A device is open, but its line settings have not been set.
    Open,
    /// A device is open and configured.
    Configured,
}

/// A serial connection to an SSCP reader.
pub struct Channel<B: Backend> {
    port: Option<B::Port>,
    baud: Option<BaudRate>,
    flags: CommFlags,
    timeouts: Timeouts,
    stats: Statistics,
    trace: bool,
}

impl<B: Backend> Channel<B> {
    /// Creates a new, closed `Channel`.
    pub fn new() -> Self {
        Self {
            port: None,
            baud: None,
            flags: CommFlags::empty(),
            timeouts: Timeouts::default(),
            stats: Statistics::default(),
            trace: false,
        }
    }

    /// Sets whether every byte sent and received is logged at trace level.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        match (&self.port, self.baud) {
            (None, _) => State::Closed,
            (Some(_), None) => State::Open,
            (Some(_), Some(_)) => State::Configured,
        }
    }

    /// Returns whether a device is open.
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Returns the configured baud rate, if any.
    pub fn baud_rate(&self) -> Option<BaudRate> {
        self.baud
    }

    /// Returns the flags the channel was opened with.
    pub fn flags(&self) -> CommFlags {
        self.flags
    }

    /// Returns the current timeout policy.
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Returns a copy of the link statistics.
    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    fn port_mut(&mut self) -> Result<&mut B::Port, Error> {
        self.port
            .as_mut()
            .ok_or_else(|| fail!(Error::CommNotOpen))
    }

    /// Opens the device `name`.
    ///
    /// Any previously open device is closed first. Unless `flags` contains
    /// [`CommFlag::NoFlush`], pending input is discarded. Statistics and
    /// timeouts are reset.
    pub fn open(&mut self, name: &str, flags: CommFlags) -> Result<(), Error> {
        let _ = self.close();

        info!("opening {}", name);
        let mut port = B::open(name).map_err(|e| {
            fail!(Error::CommNotAvailable, "cannot open {}: {}", name, e)
        })?;
        if !flags.contains(CommFlag::NoFlush) {
            if let Err(e) = port.flush_input() {
                warn!("cannot flush {}: {}", name, e);
            }
        }

        self.port = Some(port);
        self.flags = flags;
        self.timeouts = Timeouts::default();
        self.stats = Statistics::default();
        Ok(())
    }

    /// Closes the device, if one is open.
    ///
    /// Returns [`Error::CommNotOpen`] if there was nothing to close; callers
    /// that only want the channel closed may ignore that.
    pub fn close(&mut self) -> Result<(), Error> {
        match self.port.take() {
            Some(port) => {
                info!("closing device");
                drop(port);
                self.baud = None;
                Ok(())
            }
            None => Err(Error::CommNotOpen),
        }
    }

    /// Sets the line to 8N1 at `baud`.
    pub fn configure(&mut self, baud: BaudRate) -> Result<(), Error> {
        let flags = self.flags;
        let port = self.port_mut()?;
        if !flags.contains(CommFlag::NoFlush) {
            if let Err(e) = port.flush_input() {
                warn!("cannot flush: {}", e);
            }
        }
        port.configure(baud, flags).map_err(|e| {
            fail!(Error::CommControlFailed, "cannot set {} bps: {}", baud, e)
        })?;
        self.baud = Some(baud);
        Ok(())
    }

    /// Replaces the timeout policy.
    pub fn set_timeouts(&mut self, timeouts: Timeouts) -> Result<(), Error> {
        self.port_mut()?;
        self.timeouts = timeouts;
        Ok(())
    }

    /// Writes all of `buf`.
    ///
    /// Any failed or short write is reported as [`Error::CommSendFailed`].
    pub fn send(&mut self, buf: &[u8]) -> Result<(), Error> {
        let trace = self.trace;
        let start = Instant::now();
        let port = self.port_mut()?;

        let mut sent = 0;
        let result = loop {
            let remaining = buf.len() - sent;
            if remaining == 0 {
                break Ok(());
            }
            let want = port.write_chunk(remaining).max(1).min(remaining);
            let chunk = &buf[sent..sent + want];
            match port.write(chunk) {
                Ok(n) => {
                    let n = n.min(want);
                    if trace {
                        trace!("< {}", Hex(&chunk[..n]));
                    }
                    sent += n;
                    if n < want {
                        break Err(fail!(
                            Error::CommSendFailed,
                            "short write: {}/{}",
                            n,
                            want
                        ));
                    }
                }
                Err(e) => {
                    break Err(fail!(
                        Error::CommSendFailed,
                        "write({}) failed: {}",
                        want,
                        e
                    ))
                }
            }
        };

        self.account(start, result, |s| {
            s.bytes_sent = s.bytes_sent.wrapping_add(sent as u32)
        })
    }

    /// Reads exactly `buf.len()` bytes.
    ///
    /// On failure, the contents of `buf` are unspecified.
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let trace = self.trace;
        let timeouts = self.timeouts;
        let start = Instant::now();
        let port = self.port_mut()?;

        let len = buf.len();
        let mut received = 0;
        let result = loop {
            let remaining = len - received;
            if remaining == 0 {
                break Ok(());
            }
            let timeout = if received == 0 {
                timeouts.first_byte
            } else {
                timeouts.inter_byte
            };
            let want = port.read_chunk(remaining).max(1).min(remaining);
            let chunk = &mut buf[received..received + want];
            match port.read(chunk, timeout) {
                Ok(0) if received == 0 => {
                    break Err(fail!(
                        Error::CommRecvMute,
                        "no reply after {:?}",
                        timeout
                    ))
                }
                Ok(0) => {
                    break Err(fail!(
                        Error::CommRecvStopped,
                        "reply stopped at {}/{} bytes",
                        received,
                        len
                    ))
                }
                Ok(n) => {
                    let n = n.min(want);
                    if trace {
                        trace!("> {}", Hex(&chunk[..n]));
                    }
                    received += n;
                }
                Err(e) => {
                    break Err(fail!(
                        Error::CommRecvFailed,
                        "read at {}/{} failed: {}",
                        received,
                        len,
                        e
                    ))
                }
            }
        };

        self.account(start, result, |s| {
            s.bytes_received = s.bytes_received.wrapping_add(received as u32)
        })
    }

    fn account(
        &mut self,
        start: Instant,
        result: Result<(), Error>,
        bytes: impl FnOnce(&mut Statistics),
    ) -> Result<(), Error> {
        let stats = &mut self.stats;
        bytes(stats);
        stats.total_time =
            stats.total_time.wrapping_add(saturating_millis(start.elapsed()));
        if result.is_err() {
            stats.total_errors = stats.total_errors.wrapping_add(1);
        }
        result
    }
}

impl<B: Backend> Default for Channel<B> {
    fn default() -> Self {
        Self::new()
    }
}
