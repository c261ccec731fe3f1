// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Serial ports on Unix, through termios.
//!
//! Ports are opened without becoming the controlling terminal, and locked
//! with `flock(2)` so that two hosts cannot interleave frames on one
//! reader. The line is put in raw mode with `VMIN = 1`, `VTIME = 0`, and
//! the descriptor is non-blocking: both read and write timeouts are
//! implemented with `poll(2)` rather than by the tty driver.

use std::convert::TryFrom;
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use nix::errno::Errno;
use nix::fcntl;
use nix::fcntl::FlockArg;
use nix::fcntl::OFlag;
use nix::libc::c_int;
use nix::poll::poll;
use nix::poll::PollFd;
use nix::poll::PollFlags;
use nix::sys::stat::Mode;
use nix::sys::termios;
use nix::sys::termios::ControlFlags;
use nix::sys::termios::FlushArg;
use nix::sys::termios::InputFlags;
use nix::sys::termios::LocalFlags;
use nix::sys::termios::OutputFlags;
use nix::sys::termios::SetArg;
use nix::sys::termios::SpecialCharacterIndices;
use nix::unistd;

use crate::serial::Backend;
use crate::serial::BaudRate;
use crate::serial::CommFlag;
use crate::serial::CommFlags;
use crate::serial::Port;

/// The Unix [`Backend`].
pub enum Unix {}

impl Backend for Unix {
    type Port = TtyPort;

    fn open(name: &str) -> io::Result<TtyPort> {
        let fd = fcntl::open(
            name,
            OFlag::O_RDWR
                | OFlag::O_NOCTTY
                | OFlag::O_NONBLOCK
                | OFlag::O_CLOEXEC,
            Mode::empty(),
        )?;
        // From here on, dropping `port` closes `fd`.
        let port = TtyPort { fd };
        fcntl::flock(fd, FlockArg::LockExclusiveNonblock)?;
        Ok(port)
    }
}

/// An open tty.
pub struct TtyPort {
    fd: RawFd,
}

fn speed(baud: BaudRate) -> termios::BaudRate {
    match baud {
        BaudRate::B1200 => termios::BaudRate::B1200,
        BaudRate::B2400 => termios::BaudRate::B2400,
        BaudRate::B4800 => termios::BaudRate::B4800,
        BaudRate::B9600 => termios::BaudRate::B9600,
        BaudRate::B19200 => termios::BaudRate::B19200,
        BaudRate::B38400 => termios::BaudRate::B38400,
        BaudRate::B115200 => termios::BaudRate::B115200,
    }
}

/// How long a write may wait for the line to accept more data.
const WRITE_TIMEOUT_CONSTANT: Duration = Duration::from_millis(1000);
/// Added to [`WRITE_TIMEOUT_CONSTANT`] per pending byte, for at most
/// [`WRITE_TIMEOUT_BYTES`] bytes.
const WRITE_TIMEOUT_PER_BYTE: Duration = Duration::from_millis(10);
const WRITE_TIMEOUT_BYTES: usize = 256;

/// Returns how long to wait for the line to drain with `pending` bytes left.
///
/// The budget restarts whenever the line accepts data, so it bounds a
/// stall rather than the whole write.
fn write_timeout(pending: usize) -> Duration {
    let bytes = pending.min(WRITE_TIMEOUT_BYTES) as u32;
    WRITE_TIMEOUT_CONSTANT + WRITE_TIMEOUT_PER_BYTE * bytes
}

/// Milliseconds for `poll(2)`, rounded up so that a sub-millisecond timeout
/// still waits.
fn poll_millis(timeout: Duration) -> c_int {
    let ms = timeout.as_micros().saturating_add(999) / 1000;
    c_int::try_from(ms).unwrap_or(c_int::MAX)
}

impl TtyPort {
    /// Waits for `events`, returning `false` if `timeout` elapsed first.
    fn wait(&self, events: PollFlags, timeout: Duration) -> io::Result<bool> {
        let mut fds = [PollFd::new(self.fd, events)];
        loop {
            match poll(&mut fds, poll_millis(timeout)) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Port for TtyPort {
    fn configure(
        &mut self,
        baud: BaudRate,
        flags: CommFlags,
    ) -> io::Result<()> {
        let mut tio = termios::tcgetattr(self.fd)?;
        termios::cfmakeraw(&mut tio);

        tio.input_flags = InputFlags::IGNPAR | InputFlags::IGNBRK;
        tio.output_flags = OutputFlags::empty();
        tio.local_flags = LocalFlags::empty();
        tio.control_flags = ControlFlags::CS8
            | ControlFlags::CLOCAL
            | ControlFlags::CREAD;
        if flags.contains(CommFlag::FlowControl) {
            tio.control_flags |= ControlFlags::CRTSCTS;
        }
        tio.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        tio.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::cfsetspeed(&mut tio, speed(baud))?;

        termios::tcsetattr(self.fd, SetArg::TCSANOW, &tio)?;
        Ok(())
    }

    fn flush_input(&mut self) -> io::Result<()> {
        termios::tcflush(self.fd, FlushArg::TCIFLUSH)?;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            let pending = buf.len() - written;
            let timeout = write_timeout(pending);
            if !self.wait(PollFlags::POLLOUT, timeout)? {
                warn!(
                    "line stalled for {:?}; {} bytes pending",
                    timeout,
                    pending
                );
                if written > 0 {
                    break;
                }
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "line stopped draining",
                ));
            }
            match unistd::write(self.fd, &buf[written..]) {
                Ok(n) => written += n,
                Err(Errno::EINTR) | Err(Errno::EAGAIN) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(written)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        loop {
            if !self.wait(PollFlags::POLLIN, timeout)? {
                return Ok(0);
            }
            match unistd::read(self.fd, buf) {
                // The device went away between poll() and read().
                Ok(0) => {
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof))
                }
                Ok(n) => return Ok(n),
                Err(Errno::EINTR) | Err(Errno::EAGAIN) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for TtyPort {
    fn drop(&mut self) {
        if let Err(e) = unistd::close(self.fd) {
            warn!("close({}) failed: {}", self.fd, e);
        }
    }
}

#[cfg(all(test, target_os = "linux"))]
mod test {
    use super::*;
    use crate::serial::Channel;
    use crate::serial::Timeouts;
    use crate::Error;
    use nix::pty;
    use std::os::unix::io::AsRawFd;
    use std::sync::mpsc;
    use std::thread;

    // Opens a pseudo-terminal, returning the master and the slave's path.
    fn pty() -> (pty::PtyMaster, String) {
        let master =
            pty::posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).unwrap();
        pty::grantpt(&master).unwrap();
        pty::unlockpt(&master).unwrap();
        let name = pty::ptsname_r(&master).unwrap();
        (master, name)
    }

    fn channel(name: &str) -> Channel<Unix> {
        let mut ch = Channel::<Unix>::new();
        ch.open(name, CommFlags::empty()).unwrap();
        ch.configure(BaudRate::B115200).unwrap();
        ch.set_timeouts(Timeouts {
            first_byte: Duration::from_millis(200),
            inter_byte: Duration::from_millis(50),
        })
        .unwrap();
        ch
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn poll_rounding() {
        assert_eq!(poll_millis(Duration::from_millis(0)), 0);
        assert_eq!(poll_millis(Duration::from_micros(1)), 1);
        assert_eq!(poll_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(poll_millis(Duration::from_secs(u64::MAX)), c_int::MAX);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn round_trip_over_pty() {
        let (master, name) = pty();
        let mut ch = channel(&name);

        ch.send(b"ping").unwrap();
        let mut buf = [0u8; 4];
        let mut got = 0;
        while got < 4 {
            got += unistd::read(master.as_raw_fd(), &mut buf[got..]).unwrap();
        }
        assert_eq!(&buf, b"ping");

        unistd::write(master.as_raw_fd(), b"pong").unwrap();
        let mut buf = [0u8; 4];
        ch.recv(&mut buf).unwrap();
        assert_eq!(&buf, b"pong");

        let stats = ch.statistics();
        assert_eq!(stats.bytes_sent, 4);
        assert_eq!(stats.bytes_received, 4);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn timeouts_over_pty() {
        let (master, name) = pty();
        let mut ch = channel(&name);

        assert_eq!(ch.recv(&mut [0u8; 4]), Err(Error::CommRecvMute));

        unistd::write(master.as_raw_fd(), &[1, 2, 3]).unwrap();
        let mut buf = [0u8; 10];
        assert_eq!(ch.recv(&mut buf), Err(Error::CommRecvStopped));
        assert_eq!(&buf[..3], &[1u8, 2, 3][..]);
        assert_eq!(ch.statistics().total_errors, 2);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn write_budget() {
        assert_eq!(write_timeout(0), Duration::from_millis(1000));
        assert_eq!(write_timeout(10), Duration::from_millis(1100));
        assert_eq!(write_timeout(1 << 20), Duration::from_millis(3560));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn stalled_send_fails() {
        let (master, name) = pty();
        let mut ch = channel(&name);

        // Nobody reads the master, so the pty fills up and stops draining.
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let result = ch.send(&vec![0x55; 1 << 20]);
            tx.send((result, ch.statistics())).unwrap();
        });
        let (result, stats) = rx
            .recv_timeout(Duration::from_secs(30))
            .expect("send() blocked with nobody reading");
        worker.join().unwrap();

        assert_eq!(result, Err(Error::CommSendFailed));
        assert_eq!(stats.total_errors, 1);
        assert!(stats.bytes_sent < 1 << 20);
        drop(master);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn exclusive_open() {
        let (_master, name) = pty();
        let _ch = channel(&name);

        let mut other = Channel::<Unix>::new();
        assert_eq!(
            other.open(&name, CommFlags::empty()),
            Err(Error::CommNotAvailable)
        );
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn missing_device() {
        let mut ch = Channel::<Unix>::new();
        assert_eq!(
            ch.open("/dev/sscp-no-such-device", CommFlags::empty()),
            Err(Error::CommNotAvailable)
        );
    }
}
