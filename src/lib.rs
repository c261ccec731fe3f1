// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `sscp` is the host-side core of SSCP, the secure serial protocol spoken by
//! a family of smart-card/NFC reader devices.
//!
//! An SSCP host opens a serial link to the reader, runs a mutual
//! authentication handshake that establishes four session keys, and then
//! exchanges NFC and device-management commands over the authenticated
//! channel. This crate provides the two pieces of that stack that the rest of
//! it is built on:
//!
//! - The [`crypto`] and [`session`] modules: a self-contained SHA-256 and
//!   HMAC-SHA256, CBC chaining over a pluggable block cipher, and the
//!   session-key derivation run at the end of the handshake.
//! - The [`serial`] module: exact-length reads and writes over a serial port,
//!   with the two-tier timeout policy the readers expect and a precise
//!   classification of failures, so that a retry policy above it can act
//!   correctly.
//!
//! The command framing (`Authenticate`, `Outputs`, `ScanNFC`, ...) is not
//! part of this crate; it attaches to a [`reader::Reader`], which owns one
//! channel and one session.
//!
//! Every operation returns a `Result`; the crate-wide [`Error`] carries the
//! integer result codes of the SSCP host API.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![deny(warnings)]
#![deny(unused)]
#![deny(unsafe_code)]

#[cfg(feature = "log")]
extern crate log as __raw_log;

#[macro_use]
mod debug;

pub mod crypto;
mod error;
pub mod session;

#[cfg(feature = "std")]
pub mod reader;
#[cfg(feature = "std")]
pub mod serial;

pub use error::Error;
