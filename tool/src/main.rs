// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `sscp-tool` is a simple command-line tool for exercising the SSCP host
//! core: computing session keys and other test vectors, and talking to a
//! reader over a serial port.
//!
//! Set `RUST_LOG=trace` to see every byte on the wire.

#![deny(missing_docs)]
#![deny(warnings)]
#![deny(unused)]
#![deny(unsafe_code)]

use structopt::StructOpt as _;

#[macro_use]
mod util;

mod crypto;
mod serial;

/// A command-line tool for the SSCP host core.
#[allow(missing_docs)]
#[derive(structopt::StructOpt)]
#[structopt(author)]
enum CliCommand {
    #[structopt(flatten)]
    Crypto(crypto::Crypto),
    #[structopt(flatten)]
    Serial(serial::Serial),
}

fn main() {
    env_logger::init();
    match CliCommand::from_args() {
        CliCommand::Crypto(c) => c.run(),
        CliCommand::Serial(s) => s.run(),
    }
}
