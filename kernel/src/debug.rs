// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for debug output during boot.
//!
//! Chips and boards print through the `debug!` and `debug_verbose!` macros.
//! Output goes to whatever [`IoWrite`] the board registered with
//! [`set_debug_writer`]. Until a writer is registered (or on boards that
//! never register one) messages are dropped.
//!
//! ```
//! # use kernel::{debug, debug_verbose};
//! debug!("Yes the code gets here with value {}", 42);
//! debug_verbose!("got here");
//! ```

use core::fmt::{self, Arguments, Write};
use core::ptr::addr_of_mut;

/// Raw byte sink used by the debug macros, usually a polled UART.
pub trait IoWrite {
    /// Write `buf` and return the number of bytes consumed.
    fn write(&mut self, buf: &[u8]) -> usize;
}

static mut DEBUG_WRITER: Option<&'static mut dyn IoWrite> = None;

/// Register the writer debug output is sent to.
///
/// # Safety
///
/// Must be called from the single boot thread, before or between (never
/// during) uses of the debug macros.
pub unsafe fn set_debug_writer(writer: &'static mut dyn IoWrite) {
    // Safety: single-threaded boot, see the function contract.
    unsafe {
        *addr_of_mut!(DEBUG_WRITER) = Some(writer);
    }
}

struct WriterAdapter<'a> {
    inner: &'a mut dyn IoWrite,
}

impl Write for WriterAdapter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = self.inner.write(bytes);
            if written == 0 {
                return Err(fmt::Error);
            }
            bytes = &bytes[written.min(bytes.len())..];
        }
        Ok(())
    }
}

fn with_writer<F: FnOnce(&mut WriterAdapter)>(f: F) {
    // Safety: boot code is single threaded and the writer is only replaced
    // through `set_debug_writer`.
    let writer = unsafe { (*addr_of_mut!(DEBUG_WRITER)).as_deref_mut() };
    if let Some(inner) = writer {
        f(&mut WriterAdapter { inner });
    }
}

pub fn debug_println(args: Arguments) {
    with_writer(|writer| {
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    });
}

pub fn debug_verbose_println(args: Arguments, file_line: &(&'static str, u32)) {
    let (file, line) = *file_line;
    with_writer(|writer| {
        let _ = writer.write_fmt(format_args!("BOOT_DEBUG: {}:{}: ", file, line));
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    });
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg));
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+));
    });
}

/// In-kernel `println()` debugging that also prints the file and line.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        debug_verbose!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println(format_args!($msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
