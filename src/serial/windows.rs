// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Serial ports on Windows, through the Win32 communications API.
//!
//! Comm devices can only be opened exclusively, so no extra locking is
//! needed. Read timeouts are programmed into the driver with
//! `SetCommTimeouts()` before each read whose timeout differs from the
//! previous one; the settings used make `ReadFile()` return as soon as any
//! byte is available, or with nothing once the timeout elapses.
//!
//! Some USB-serial drivers for the readers misbehave with large transfers,
//! so writes are split into 256-byte chunks (unless the rest of a frame fits
//! in 260 bytes), and reads into 32-byte chunks.

#![allow(unsafe_code)]

use std::convert::TryFrom;
use std::ffi::OsStr;
use std::io;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use std::time::Duration;

use winapi::shared::minwindef::DWORD;
use winapi::shared::minwindef::FALSE;
use winapi::um::commapi::ClearCommError;
use winapi::um::commapi::GetCommState;
use winapi::um::commapi::PurgeComm;
use winapi::um::commapi::SetCommState;
use winapi::um::commapi::SetCommTimeouts;
use winapi::um::commapi::SetupComm;
use winapi::um::fileapi::CreateFileW;
use winapi::um::fileapi::ReadFile;
use winapi::um::fileapi::WriteFile;
use winapi::um::fileapi::OPEN_EXISTING;
use winapi::um::handleapi::CloseHandle;
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::winbase::COMMTIMEOUTS;
use winapi::um::winbase::DCB;
use winapi::um::winbase::DTR_CONTROL_ENABLE;
use winapi::um::winbase::NOPARITY;
use winapi::um::winbase::ONESTOPBIT;
use winapi::um::winbase::PURGE_RXCLEAR;
use winapi::um::winbase::RTS_CONTROL_ENABLE;
use winapi::um::winbase::RTS_CONTROL_HANDSHAKE;
use winapi::um::winnt::GENERIC_READ;
use winapi::um::winnt::GENERIC_WRITE;
use winapi::um::winnt::HANDLE;
use winapi::um::winnt::MAXDWORD;

use crate::serial::Backend;
use crate::serial::BaudRate;
use crate::serial::CommFlag;
use crate::serial::CommFlags;
use crate::serial::Port;

/// Driver queue sizes requested on open.
const QUEUE_LEN: DWORD = 512;

const WRITE_CHUNK: usize = 256;
const WRITE_CHUNK_THRESHOLD: usize = 260;
const READ_CHUNK: usize = 32;

/// Write timeout: a fixed allowance plus a per-byte allowance that covers
/// the slowest supported rate.
const WRITE_TIMEOUT_CONSTANT_MS: DWORD = 1000;
const WRITE_TIMEOUT_PER_BYTE_MS: DWORD = 10;

/// The Windows [`Backend`].
pub enum Windows {}

/// Turns `COM3` into `\\.\COM3`, which is required for `COM10` and up.
fn device_path(name: &str) -> Vec<u16> {
    let full = if name.starts_with(r"\\.\") {
        name.to_string()
    } else {
        format!(r"\\.\{}", name)
    };
    OsStr::new(&full)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn check(ok: i32) -> io::Result<()> {
    if ok == FALSE {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

impl Backend for Windows {
    type Port = ComPort;

    fn open(name: &str) -> io::Result<ComPort> {
        let path = device_path(name);
        // SAFETY: `path` is NUL-terminated and outlives the call.
        let handle = unsafe {
            CreateFileW(
                path.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                0,
                ptr::null_mut(),
                OPEN_EXISTING,
                0,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }

        let port = ComPort {
            handle,
            read_timeout: None,
        };
        // SAFETY: `port.handle` is a valid comm handle.
        check(unsafe { SetupComm(port.handle, QUEUE_LEN, QUEUE_LEN) })?;
        Ok(port)
    }
}

/// An open comm device.
pub struct ComPort {
    handle: HANDLE,
    /// The read timeout currently programmed into the driver.
    read_timeout: Option<DWORD>,
}

// SAFETY: the handle is owned exclusively by this value, and comm handles
// may be used from any thread.
unsafe impl Send for ComPort {}

impl ComPort {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        // Both MAXDWORD and zero have special meanings here.
        let ms = DWORD::try_from(timeout.as_millis())
            .unwrap_or(MAXDWORD)
            .clamp(1, MAXDWORD - 1);
        if self.read_timeout == Some(ms) {
            return Ok(());
        }

        let mut timeouts = COMMTIMEOUTS {
            ReadIntervalTimeout: MAXDWORD,
            ReadTotalTimeoutMultiplier: MAXDWORD,
            ReadTotalTimeoutConstant: ms,
            WriteTotalTimeoutMultiplier: WRITE_TIMEOUT_PER_BYTE_MS,
            WriteTotalTimeoutConstant: WRITE_TIMEOUT_CONSTANT_MS,
        };
        // SAFETY: `self.handle` is a valid comm handle; `timeouts` is a
        // valid `COMMTIMEOUTS`.
        check(unsafe { SetCommTimeouts(self.handle, &mut timeouts) })?;
        self.read_timeout = Some(ms);
        Ok(())
    }

    /// Re-enables I/O after an error aborted it, and returns that error.
    fn clear_error(&mut self) -> io::Error {
        let e = io::Error::last_os_error();
        let mut errors: DWORD = 0;
        // SAFETY: `self.handle` is a valid comm handle; a null `COMSTAT` is
        // allowed.
        unsafe { ClearCommError(self.handle, &mut errors, ptr::null_mut()) };
        e
    }
}

impl Port for ComPort {
    fn configure(
        &mut self,
        baud: BaudRate,
        flags: CommFlags,
    ) -> io::Result<()> {
        // SAFETY: `DCB` is plain old data.
        let mut dcb: DCB = unsafe { mem::zeroed() };
        dcb.DCBlength = mem::size_of::<DCB>() as DWORD;
        // SAFETY: `self.handle` is a valid comm handle.
        check(unsafe { GetCommState(self.handle, &mut dcb) })?;

        dcb.BaudRate = baud.bps();
        dcb.ByteSize = 8;
        dcb.Parity = NOPARITY;
        dcb.StopBits = ONESTOPBIT;
        dcb.set_fBinary(1);
        dcb.set_fParity(0);
        dcb.set_fOutxDsrFlow(0);
        dcb.set_fDsrSensitivity(0);
        dcb.set_fOutX(0);
        dcb.set_fInX(0);
        dcb.set_fNull(0);
        dcb.set_fDtrControl(DTR_CONTROL_ENABLE);
        if flags.contains(CommFlag::FlowControl) {
            dcb.set_fOutxCtsFlow(1);
            dcb.set_fRtsControl(RTS_CONTROL_HANDSHAKE);
        } else {
            dcb.set_fOutxCtsFlow(0);
            dcb.set_fRtsControl(RTS_CONTROL_ENABLE);
        }
        dcb.set_fAbortOnError(1);
        dcb.set_fTXContinueOnXoff(1);

        // SAFETY: `self.handle` is a valid comm handle.
        check(unsafe { SetCommState(self.handle, &mut dcb) })
    }

    fn flush_input(&mut self) -> io::Result<()> {
        // SAFETY: `self.handle` is a valid comm handle.
        check(unsafe { PurgeComm(self.handle, PURGE_RXCLEAR) })
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = DWORD::try_from(buf.len()).unwrap_or(MAXDWORD);
        let mut written: DWORD = 0;
        // SAFETY: `buf` is valid for `len` bytes; I/O is synchronous.
        let ok = unsafe {
            WriteFile(
                self.handle,
                buf.as_ptr().cast(),
                len,
                &mut written,
                ptr::null_mut(),
            )
        };
        if ok == FALSE {
            return Err(self.clear_error());
        }
        Ok(written as usize)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.set_read_timeout(timeout)?;

        let len = DWORD::try_from(buf.len()).unwrap_or(MAXDWORD);
        let mut got: DWORD = 0;
        // SAFETY: `buf` is valid for `len` bytes; I/O is synchronous.
        let ok = unsafe {
            ReadFile(
                self.handle,
                buf.as_mut_ptr().cast(),
                len,
                &mut got,
                ptr::null_mut(),
            )
        };
        if ok == FALSE {
            return Err(self.clear_error());
        }
        Ok(got as usize)
    }

    fn write_chunk(&self, remaining: usize) -> usize {
        if remaining >= WRITE_CHUNK_THRESHOLD {
            WRITE_CHUNK
        } else {
            remaining
        }
    }

    fn read_chunk(&self, remaining: usize) -> usize {
        remaining.min(READ_CHUNK)
    }
}

impl Drop for ComPort {
    fn drop(&mut self) {
        // SAFETY: `self.handle` is valid, and never used again.
        if unsafe { CloseHandle(self.handle) } == FALSE {
            warn!("CloseHandle failed: {}", io::Error::last_os_error());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn device_paths() {
        let path = |s| String::from_utf16_lossy(&device_path(s));
        assert_eq!(path("COM3"), "\\\\.\\COM3\0");
        assert_eq!(path("COM12"), "\\\\.\\COM12\0");
        assert_eq!(path(r"\\.\COM12"), "\\\\.\\COM12\0");
    }

    #[test]
    fn missing_device() {
        assert!(Windows::open("COM255").is_err());
    }
}
