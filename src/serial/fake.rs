// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A scripted [`Backend`] for tests.
//!
//! A test builds a [`Script`] of what the "device" will say, installs it
//! under a fresh port name, and opens that name with a `Channel<Fake>`. The
//! script's [`Log`] records everything the channel did to the port.
//!
//! Reads never block: once the script runs dry, every read times out
//! immediately.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::serial::Backend;
use crate::serial::BaudRate;
use crate::serial::CommFlags;
use crate::serial::Port;

thread_local! {
    static INSTALLED: RefCell<HashMap<String, Script>> =
        RefCell::new(HashMap::new());
    static NEXT_ID: Cell<usize> = Cell::new(0);
}

/// Everything a channel did to a [`FakePort`].
#[derive(Default, Debug)]
pub struct Log {
    pub closed: bool,
    pub flushes: usize,
    pub configured: Option<(BaudRate, CommFlags)>,
    pub written: Vec<u8>,
    pub write_sizes: Vec<usize>,
    pub read_sizes: Vec<usize>,
    pub read_timeouts: Vec<Duration>,
}

enum Event {
    Data(Vec<u8>),
    Fail,
}

struct Chunking {
    write_chunk: usize,
    write_threshold: usize,
    read_chunk: usize,
}

/// A script for a [`FakePort`].
pub struct Script {
    events: VecDeque<Event>,
    reject_configure: bool,
    write_cap: Option<usize>,
    chunking: Option<Chunking>,
    log: Rc<RefCell<Log>>,
}

impl Script {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            reject_configure: false,
            write_cap: None,
            chunking: None,
            log: Rc::default(),
        }
    }

    /// Queues bytes for the channel to read. Each reply is delivered by
    /// separate reads.
    pub fn reply(mut self, data: &[u8]) -> Self {
        self.events.push_back(Event::Data(data.to_vec()));
        self
    }

    /// Queues a read error.
    pub fn fail_read(mut self) -> Self {
        self.events.push_back(Event::Fail);
        self
    }

    pub fn reject_configure(mut self) -> Self {
        self.reject_configure = true;
        self
    }

    /// Makes every write accept at most `cap` bytes.
    pub fn accept_writes(mut self, cap: usize) -> Self {
        self.write_cap = Some(cap);
        self
    }

    /// Makes the port ask for `write_chunk`-byte writes once at least
    /// `write_threshold` bytes remain, and `read_chunk`-byte reads.
    pub fn chunked(
        mut self,
        write_chunk: usize,
        write_threshold: usize,
        read_chunk: usize,
    ) -> Self {
        self.chunking = Some(Chunking {
            write_chunk,
            write_threshold,
            read_chunk,
        });
        self
    }

    pub fn log(&self) -> Rc<RefCell<Log>> {
        Rc::clone(&self.log)
    }

    /// Makes this script openable, returning the port name to open.
    pub fn install(self) -> String {
        let id = NEXT_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        let name = format!("fake{}", id);
        INSTALLED.with(|i| i.borrow_mut().insert(name.clone(), self));
        name
    }
}

/// The fake [`Backend`].
pub enum Fake {}

impl Backend for Fake {
    type Port = FakePort;

    fn open(name: &str) -> io::Result<FakePort> {
        INSTALLED
            .with(|i| i.borrow_mut().remove(name))
            .map(|script| FakePort { script })
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// A port that follows a [`Script`].
pub struct FakePort {
    script: Script,
}

impl Port for FakePort {
    fn configure(
        &mut self,
        baud: BaudRate,
        flags: CommFlags,
    ) -> io::Result<()> {
        if self.script.reject_configure {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        self.script.log.borrow_mut().configured = Some((baud, flags));
        Ok(())
    }

    fn flush_input(&mut self) -> io::Result<()> {
        self.script.log.borrow_mut().flushes += 1;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.script.write_cap {
            Some(cap) => buf.len().min(cap),
            None => buf.len(),
        };
        let mut log = self.script.log.borrow_mut();
        log.write_sizes.push(buf.len());
        log.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn read(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<usize> {
        {
            let mut log = self.script.log.borrow_mut();
            log.read_sizes.push(buf.len());
            log.read_timeouts.push(timeout);
        }

        match self.script.events.front_mut() {
            None => Ok(0),
            Some(Event::Fail) => {
                self.script.events.pop_front();
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            Some(Event::Data(data)) => {
                let n = buf.len().min(data.len());
                buf[..n].copy_from_slice(&data[..n]);
                data.drain(..n);
                if data.is_empty() {
                    self.script.events.pop_front();
                }
                Ok(n)
            }
        }
    }

    fn write_chunk(&self, remaining: usize) -> usize {
        match &self.script.chunking {
            Some(c) if remaining >= c.write_threshold => c.write_chunk,
            _ => remaining,
        }
    }

    fn read_chunk(&self, remaining: usize) -> usize {
        match &self.script.chunking {
            Some(c) => remaining.min(c.read_chunk),
            None => remaining,
        }
    }
}

impl Drop for FakePort {
    fn drop(&mut self) {
        self.script.log.borrow_mut().closed = true;
    }
}
