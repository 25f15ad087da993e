//! # x86-64 bindings
//!
//! Everything needed to run the subsystem on the bootstrap CPU:
//!
//! - [`X86Hardware`], the [`InterruptHardware`](crate::hal::InterruptHardware)
//!   implementation backed by inline assembly;
//! - the entry trampolines for the 32 fault vectors and 16 IRQ lines;
//! - one global, boot-once [`KernelInterrupts`] instance the trampolines
//!   dispatch into, set up by [`install`].
//!
//! ```no_run
//! use kernel_interrupts::IrqLine;
//! use kernel_interrupts::x86;
//!
//! fn on_key() { /* read port 0x60 */ }
//!
//! # const KERNEL_CS: u16 = 0x08;
//! kernel_qemu::QemuLogger::new(log::LevelFilter::Debug)
//!     .init()
//!     .expect("first logger");
//!
//! // GDT first, then:
//! let interrupts = unsafe { x86::install(KERNEL_CS) }.expect("interrupts installed once");
//! interrupts.register(IrqLine::KEYBOARD, on_key);
//! ```

mod global;
mod hardware;
mod stubs;

pub use global::{KernelInterrupts, install, installed, register_irq_handler};
pub use hardware::X86Hardware;
pub use stubs::entry_stubs;
