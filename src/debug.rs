// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Debug-logging functionality.
//!
//! This module is still present when the `log` feature is disabled, but all
//! logging operations are redacted. Redacted log statements are still
//! type-checked, so that their arguments count as used, but they are never
//! executed, and the optimizer removes them together with their format
//! strings.
//!
//! SSCP code *should not* call into the [`log`] crate directly outside of
//! this module.
//!
//! Secret key material must never reach these macros. Types that hold it
//! (such as [`crate::crypto::AuthKey`]) do not implement any formatting trait
//! that exposes their contents.

// no_std builds compile out the serial stack, which is the only user of some
// of these.
#![allow(unused_macros)]

#[cfg(doc)]
use __raw_log as log;

/// Checks a condition, logging if it fails.
///
/// If the condition does not hold, constructs the given error, logs it, and
/// returns out of the current function with it.
macro_rules! check {
    ($cond:expr, $error:expr) => {
        if !$cond {
            let error = $error;
            return Err(fail!(
                error,
                "check failure: `{}`; returned {:?}",
                stringify!($cond),
                error,
            )
            .into());
        }
    };
}

/// Logs a newly-created error value and evaluates to it.
///
/// This macro is the main way to generate error values.
///
/// For example, instead of writing `foo.ok_or(MyError)`, instead write
/// `foo.ok_or_else(|| fail!(MyError))`.
macro_rules! fail {
    ($error:expr, $($format:tt)+) => {{
        error!($($format)+);
        $error
    }};
    ($error:expr) => {{
        let error = $error;
        error!("generated error: `{:?}`", error);
        error
    }};
}

/// Redactable version of [`log::trace!()`].
macro_rules! trace {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::trace!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = if false {
            $crate::debug::redacted(format_args!($($args)*))
        };
    }
}

/// Redactable version of [`log::info!()`].
macro_rules! info {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::info!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = if false {
            $crate::debug::redacted(format_args!($($args)*))
        };
    }
}

/// Redactable version of [`log::warn!()`].
macro_rules! warn {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::warn!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = if false {
            $crate::debug::redacted(format_args!($($args)*))
        };
    }
}

/// Redactable version of [`log::error!()`].
macro_rules! error {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::error!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = if false {
            $crate::debug::redacted(format_args!($($args)*))
        };
    }
}

/// Sink for redacted log statements; never actually called.
#[cfg(not(feature = "log"))]
#[inline(always)]
pub(crate) fn redacted(_: core::fmt::Arguments) {}

/// Formats a byte buffer as contiguous upper-case hex, the way SSCP traces
/// have always printed frames and key material.
pub(crate) struct Hex<'a>(pub &'a [u8]);

impl core::fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for b in self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Set up some life-before-main code that initializes a basic logger for the
/// test binary.
///
/// This needs to happen here, since the test binary's main() cannot be
/// overridden.
#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    env_logger::builder()
        .format(move |_, record| {
            let thread = std::thread::current();
            let name = thread.name().unwrap_or("<unknown>");
            for line in record.args().to_string().trim().lines() {
                // NOTE: we explicitly print to stderr, since this allows the
                // Rust test harness to suppress log statements originating from
                // passing tests.
                eprintln!(
                    "[{level}({thread}) {file}:{line}] {msg}",
                    level = record.level(),
                    thread = name,
                    file = record.file().unwrap_or("<unknown>"),
                    line = record.line().unwrap_or(0),
                    msg = line,
                )
            }
            Ok(())
        })
        .init();
}

#[cfg(test)]
mod test {
    use super::Hex;

    #[test]
    fn hex_is_upper_case_and_unseparated() {
        assert_eq!(Hex(&[0x02, 0x6a, 0xff]).to_string(), "026AFF");
        assert_eq!(Hex(&[]).to_string(), "");
    }
}
