// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Offline cryptographic computations, for producing and checking vectors.

use std::io::Read as _;
use std::io::Write as _;
use std::path::PathBuf;

use sscp::crypto::aes;
use sscp::crypto::cbc;
use sscp::crypto::csrng::Csrng as _;
use sscp::crypto::hmac;
use sscp::crypto::ring;
use sscp::crypto::soft;
use sscp::crypto::AuthKey;
use sscp::crypto::Challenge;
use sscp::session::kdf;

use crate::util;

/// Cryptographic subcommands.
#[derive(structopt::StructOpt)]
pub enum Crypto {
    /// Derives the session keys for an authentication key and challenges,
    /// printing them as JSON.
    Kdf {
        /// The 16-byte authentication key, in hex.
        #[structopt(short = "k", long, parse(try_from_str = util::parse_16))]
        key: [u8; 16],

        /// The reader challenge, RndB, in hex.
        #[structopt(long, parse(try_from_str = util::parse_16))]
        rnd_b: [u8; 16],

        /// The host challenge, RndA, in hex. It does not affect the keys.
        #[structopt(long, parse(try_from_str = util::parse_16))]
        rnd_a: Option<[u8; 16]>,

        /// Log every intermediate value at trace level.
        #[structopt(long)]
        trace: bool,
    },

    /// Computes the HMAC-SHA256 of the input under a 16-byte key.
    Hmac {
        /// The 16-byte key, in hex.
        #[structopt(short = "k", long, parse(try_from_str = util::parse_16))]
        key: [u8; 16],

        /// Input file (defaults to stdin).
        #[structopt(short = "i", long)]
        input: Option<PathBuf>,
    },

    /// Encrypts or decrypts the input with AES-128-CBC, without padding.
    Cbc {
        /// Decrypt instead of encrypting.
        #[structopt(short = "d", long)]
        decrypt: bool,

        /// The 16-byte key, in hex.
        #[structopt(short = "k", long, parse(try_from_str = util::parse_16))]
        key: [u8; 16],

        /// The 16-byte IV, in hex.
        #[structopt(long, parse(try_from_str = util::parse_16))]
        iv: [u8; 16],

        /// Input file (defaults to stdin).
        #[structopt(short = "i", long)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout).
        #[structopt(short = "o", long)]
        output: Option<PathBuf>,
    },

    /// Prints random bytes from the OS generator, in hex.
    Random {
        /// Number of bytes.
        #[structopt(short = "n", long, default_value = "16")]
        len: usize,
    },
}

impl Crypto {
    pub fn run(self) {
        match self {
            Self::Kdf {
                key,
                rnd_b,
                rnd_a,
                trace,
            } => {
                let keys = check!(
                    kdf::derive(
                        &mut aes::Cipher::new(),
                        &mut soft::hash::Engine::new(),
                        &AuthKey::new(key),
                        &Challenge::new(rnd_a.unwrap_or_default()),
                        &Challenge::new(rnd_b),
                        kdf::Options { trace },
                    )
                    .map_err(sscp::Error::from),
                    "deriving keys"
                );
                let json = serde_json::json!({
                    "cipher_ab": util::to_hex(keys.cipher_ab.as_bytes()),
                    "cipher_ba": util::to_hex(keys.cipher_ba.as_bytes()),
                    "sign_ab": util::to_hex(keys.sign_ab.as_bytes()),
                    "sign_ba": util::to_hex(keys.sign_ba.as_bytes()),
                });
                println!("{:#}", json);
            }
            Self::Hmac { key, input } => {
                let (mut r, _) = util::stdio(input, None::<PathBuf>);
                let mut data = Vec::new();
                check!(r.read_to_end(&mut data), "reading input");
                println!("{}", util::to_hex(&hmac::hmac(&key, &data)));
            }
            Self::Cbc {
                decrypt,
                key,
                iv,
                input,
                output,
            } => {
                let (mut r, mut w) = util::stdio(input, output);
                let mut data = Vec::new();
                check!(r.read_to_end(&mut data), "reading input");

                let mut cipher = aes::Cipher::new();
                let result = if decrypt {
                    cbc::decrypt(&mut cipher, &key, &iv, &mut data)
                } else {
                    cbc::encrypt(&mut cipher, &key, &iv, &mut data)
                };
                check!(result.map_err(sscp::Error::from), "cbc");
                check!(w.write_all(&data), "writing output");
            }
            Self::Random { len } => {
                let mut buf = vec![0; len];
                check!(
                    ring::csrng::Csrng::new()
                        .fill(&mut buf)
                        .map_err(sscp::Error::from),
                    "drawing random bytes"
                );
                println!("{}", util::to_hex(&buf));
            }
        }
    }
}
