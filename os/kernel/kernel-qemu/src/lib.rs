//! # QEMU Debug Console
//!
//! Byte-wise output to QEMU's `-debugcon` device at I/O port `0x402`.
//!
//! The crate offers three ways in:
//!
//! * [`DebugConsole`], a [`core::fmt::Write`] sink. The interrupt subsystem
//!   hands it to the fault reporter as its diagnostic output.
//! * [`qemu_trace!`], a `format_args!`-style macro for ad-hoc traces.
//! * [`QemuLogger`], a `log::Log` backend so the rest of the kernel can use
//!   `info!`/`error!` and friends.
//!
//! Host side:
//!
//! ```bash
//! qemu-system-x86_64 ... -debugcon stdio
//! ```
//!
//! With the `enabled` feature turned off every write becomes a no-op and no
//! port I/O is compiled in.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::QemuLogger;

use core::fmt::{self, Write};

/// The port number for QEMU's debug console.
pub const QEMU_DEBUG_PORT: u16 = 0x402;

/// Diagnostic sink writing every byte to [`QEMU_DEBUG_PORT`].
///
/// The sink is stateless; create one wherever output is needed, including
/// from within a fault handler.
#[derive(Copy, Clone, Debug, Default)]
pub struct DebugConsole;

impl DebugConsole {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Write a single raw byte.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    pub fn put_byte(self, byte: u8) {
        #[cfg(all(feature = "enabled", target_arch = "x86_64"))]
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") QEMU_DEBUG_PORT,
                in("al") byte,
                options(nomem, nostack, preserves_flags)
            );
        }

        #[cfg(not(all(feature = "enabled", target_arch = "x86_64")))]
        let _ = byte;
    }
}

impl Write for DebugConsole {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            self.put_byte(b);
        }
        Ok(())
    }
}

#[doc(hidden)]
#[inline]
pub fn qemu_write(args: fmt::Arguments) {
    // Best-effort; the console cannot report failure.
    let _ = DebugConsole.write_fmt(args);
}

#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_write(core::format_args!($($arg)*));
    }};
}
