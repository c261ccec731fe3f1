// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! I/O and parsing utilities.

use std::convert::TryFrom;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// Like `?`, but crashes the binary with a nice error message.
macro_rules! check {
    ($result:expr, $fmt:literal $(, $args:expr)* $(,)?) => {
        match $result {
            Ok(x) => x,
            Err(e) => {
                eprintln!("error: {}: {}", format_args!($fmt, $($args,)*), e);
                std::process::exit(2)
            }
        }
    }
}

/// Opens the given input and output files.
///
/// If either file is missing, it is replaced with stdin or stdout, respectively.
pub fn stdio(
    input_file: Option<impl AsRef<Path>>,
    output_file: Option<impl AsRef<Path>>,
) -> (Box<dyn Read>, Box<dyn Write>) {
    let input: Box<dyn Read> = match input_file {
        Some(path) => {
            let path = path.as_ref();
            let file = check!(File::open(path), "opening {}", path.display());
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin()),
    };

    let output: Box<dyn Write> = match output_file {
        Some(path) => {
            let path = path.as_ref();
            let file = check!(File::create(path), "creating {}", path.display());
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };

    (input, output)
}

/// Parses a 16-byte value (a key, block or challenge) from hex.
pub fn parse_16(s: &str) -> Result<[u8; 16], String> {
    let bytes = hex::decode(s).map_err(|e| e.to_string())?;
    <[u8; 16]>::try_from(bytes.as_slice())
        .map_err(|_| format!("expected 16 bytes, got {}", bytes.len()))
}

/// Parses an arbitrary-length byte string from hex.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s)
}

/// Formats bytes as upper-case hex, the way reader traces print them.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}
