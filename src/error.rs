// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The SSCP host result codes.

use core::fmt;

use crate::crypto::block;
use crate::crypto::cbc;
use crate::crypto::csrng;
use crate::crypto::hash;
use crate::session;

/// An error returned by an SSCP host operation.
///
/// Each variant corresponds to one of the integer result codes of the SSCP
/// host API; see [`Error::code()`]. Success is represented by `Ok`, and has
/// the code `0`.
///
/// Errors are always returned, never retried: deciding what to do about,
/// e.g., a mute reader is left to the command layer.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Error {
    /// An operation was invoked on a connection or session that is not in
    /// the state the operation requires.
    InvalidContext,
    /// An argument was out of range, such as an unsupported baud rate or a
    /// buffer of the wrong length.
    InvalidParameter,
    /// The serial device could not be opened.
    CommNotAvailable,
    /// The operation requires an open serial channel.
    CommNotOpen,
    /// The platform rejected a configuration request.
    CommControlFailed,
    /// A write did not complete.
    CommSendFailed,
    /// A low-level read error occurred.
    CommRecvFailed,
    /// Nothing arrived before the first-byte timeout.
    CommRecvMute,
    /// Some bytes arrived, but the reply stalled before it was complete.
    CommRecvStopped,
}

impl Error {
    /// Returns the integer result code for this error.
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidContext => -1,
            Self::InvalidParameter => -2,
            Self::CommNotAvailable => -10,
            Self::CommNotOpen => -11,
            Self::CommControlFailed => -12,
            Self::CommSendFailed => -13,
            Self::CommRecvFailed => -14,
            Self::CommRecvMute => -15,
            Self::CommRecvStopped => -16,
        }
    }

    /// Looks up the error for an integer result code.
    ///
    /// Returns `None` for `0` (success) and for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        let e = match code {
            -1 => Self::InvalidContext,
            -2 => Self::InvalidParameter,
            -10 => Self::CommNotAvailable,
            -11 => Self::CommNotOpen,
            -12 => Self::CommControlFailed,
            -13 => Self::CommSendFailed,
            -14 => Self::CommRecvFailed,
            -15 => Self::CommRecvMute,
            -16 => Self::CommRecvStopped,
            _ => return None,
        };
        Some(e)
    }

    /// Returns whether this error is a receive timeout, i.e., a failure that
    /// a command layer may reasonably retry.
    pub fn is_timeout(self) -> bool {
        matches!(self, Self::CommRecvMute | Self::CommRecvStopped)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            Self::InvalidContext => "invalid context",
            Self::InvalidParameter => "invalid parameter",
            Self::CommNotAvailable => "serial device not available",
            Self::CommNotOpen => "serial channel not open",
            Self::CommControlFailed => "serial configuration rejected",
            Self::CommSendFailed => "serial write failed",
            Self::CommRecvFailed => "serial read failed",
            Self::CommRecvMute => "device did not answer",
            Self::CommRecvStopped => "device reply stopped early",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<cbc::Error> for Error {
    fn from(e: cbc::Error) -> Self {
        match e {
            cbc::Error::InvalidLength => Self::InvalidParameter,
            cbc::Error::Cipher(e) => e.into(),
        }
    }
}

impl From<block::Error> for Error {
    fn from(e: block::Error) -> Self {
        match e {
            block::Error::NoKey => Self::InvalidContext,
            block::Error::Unspecified => Self::InvalidParameter,
        }
    }
}

impl From<hash::Error> for Error {
    fn from(e: hash::Error) -> Self {
        match e {
            hash::Error::Idle => Self::InvalidContext,
            hash::Error::Unspecified => Self::InvalidParameter,
        }
    }
}

impl From<csrng::Error> for Error {
    fn from(_: csrng::Error) -> Self {
        Self::InvalidContext
    }
}

impl From<session::Error> for Error {
    fn from(e: session::Error) -> Self {
        match e {
            session::Error::BadStateTransition => Self::InvalidContext,
            session::Error::Cipher(e) => e.into(),
            session::Error::Hash(e) => e.into(),
            session::Error::Rng(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL: &[Error] = &[
        Error::InvalidContext,
        Error::InvalidParameter,
        Error::CommNotAvailable,
        Error::CommNotOpen,
        Error::CommControlFailed,
        Error::CommSendFailed,
        Error::CommRecvFailed,
        Error::CommRecvMute,
        Error::CommRecvStopped,
    ];

    #[test]
    fn codes_round_trip() {
        for &e in ALL {
            assert!(e.code() < 0);
            assert_eq!(Error::from_code(e.code()), Some(e));
        }
        assert_eq!(Error::from_code(0), None);
        assert_eq!(Error::from_code(-3), None);
    }

    #[test]
    fn only_receive_stalls_are_timeouts() {
        let timeouts: Vec<_> = ALL.iter().filter(|e| e.is_timeout()).collect();
        assert_eq!(timeouts, [&Error::CommRecvMute, &Error::CommRecvStopped]);
    }

    #[test]
    fn component_errors_map_to_codes() {
        assert_eq!(
            Error::from(cbc::Error::InvalidLength),
            Error::InvalidParameter
        );
        assert_eq!(
            Error::from(cbc::Error::Cipher(block::Error::NoKey)),
            Error::InvalidContext
        );
        assert_eq!(
            Error::from(session::Error::BadStateTransition),
            Error::InvalidContext
        );
    }
}
