// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Talking to a reader over a serial port.

use std::convert::TryFrom as _;
use std::time::Duration;

use sscp::serial::BaudRate;
use sscp::serial::Channel;
use sscp::serial::CommFlag;
use sscp::serial::CommFlags;
use sscp::serial::System;
use sscp::serial::Timeouts;

use crate::util;

/// Serial subcommands.
#[derive(structopt::StructOpt)]
pub enum Serial {
    /// Opens a port, optionally sends a raw frame and reads a reply, then
    /// prints the link statistics as JSON.
    Probe {
        /// The serial device, such as `/dev/ttyUSB0` or `COM3`.
        #[structopt(short = "p", long)]
        port: String,

        /// The baud rate.
        #[structopt(short = "b", long, default_value = "38400")]
        baud: u32,

        /// Do not discard pending input.
        #[structopt(long)]
        no_flush: bool,

        /// Use RTS/CTS flow control.
        #[structopt(long)]
        flow_control: bool,

        /// First-byte timeout, in milliseconds.
        #[structopt(long, default_value = "1000")]
        first_byte_ms: u64,

        /// Inter-byte timeout, in milliseconds.
        #[structopt(long, default_value = "50")]
        inter_byte_ms: u64,

        /// Bytes to send, in hex.
        #[structopt(short = "s", long)]
        send: Option<String>,

        /// Number of reply bytes to read.
        #[structopt(short = "r", long, default_value = "0")]
        recv: usize,
    },
}

impl Serial {
    pub fn run(self) {
        match self {
            Self::Probe {
                port,
                baud,
                no_flush,
                flow_control,
                first_byte_ms,
                inter_byte_ms,
                send,
                recv,
            } => {
                let baud = check!(BaudRate::try_from(baud), "baud rate");
                let mut flags = CommFlags::empty();
                if no_flush {
                    flags |= CommFlag::NoFlush;
                }
                if flow_control {
                    flags |= CommFlag::FlowControl;
                }

                let mut ch = Channel::<System>::new();
                ch.set_trace(true);
                check!(ch.open(&port, flags), "opening {}", port);
                check!(ch.configure(baud), "configuring {}", port);
                check!(
                    ch.set_timeouts(Timeouts {
                        first_byte: Duration::from_millis(first_byte_ms),
                        inter_byte: Duration::from_millis(inter_byte_ms),
                    }),
                    "setting timeouts"
                );
                log::info!("{} open at {} bps", port, baud);

                if let Some(frame) = send {
                    let frame = check!(util::parse_hex(&frame), "--send");
                    check!(ch.send(&frame), "sending");
                }
                if recv > 0 {
                    let mut reply = vec![0; recv];
                    match ch.recv(&mut reply) {
                        Ok(()) => println!("{}", util::to_hex(&reply)),
                        Err(e) if e.is_timeout() => {
                            eprintln!("warning: {} (code {})", e, e.code())
                        }
                        Err(e) => {
                            eprintln!("error: receiving: {}", e);
                            std::process::exit(2)
                        }
                    }
                }

                let stats = ch.statistics();
                let _ = ch.close();
                println!("{:#}", check!(serde_json::to_value(&stats), "json"));
            }
        }
    }
}
