//! # Interrupt and exception dispatch
//!
//! Builds the x86-64 vector table, reprograms the legacy 8259 PIC pair,
//! routes hardware interrupts to registered handlers and turns every CPU
//! exception into a diagnostic dump followed by a halt.
//!
//! ## Layers
//! - [`vector`]: the 16-byte gate descriptor codec.
//! - [`table`]: the 64-slot [`DescriptorTable`] and its IDTR record.
//! - [`installer`]: [`VectorInstaller`], filling fault (0..=31) and IRQ
//!   (32..=47) slots.
//! - [`pic`]: [`ChainedPics`], remap and end-of-interrupt.
//! - [`registry`]: [`HandlerRegistry`], one optional handler per IRQ line.
//! - [`fault`]: [`TrapFrame`] and the fault report format.
//! - [`subsystem`] and [`dispatch`]: [`InterruptSubsystem`], owning all of the
//!   above, with the boot sequence and the two runtime entry points.
//! - [`hal`]: [`InterruptHardware`], the privileged operations, so everything
//!   above runs against a recorder in tests.
//! - `x86` (feature `x86`): the real hardware, the entry trampolines and the
//!   global boot-once instance.
//!
//! ## Ordering checklist
//! 1. Load the GDT; its kernel code selector goes into every gate.
//! 2. `clear` + `lidt` the table.
//! 3. Install the fault vectors.
//! 4. Remap the PICs to 32/40.
//! 5. Install the IRQ vectors.
//! 6. `sti`.
//!
//! [`InterruptSubsystem::boot`] performs 2–5; step 6 is
//! [`InterruptSubsystem::enable_interrupts`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod dispatch;
mod error;
pub mod fault;
pub mod hal;
pub mod installer;
mod line;
pub mod pic;
pub mod registry;
pub mod subsystem;
pub mod table;
pub mod vector;

#[cfg(all(feature = "x86", target_arch = "x86_64"))]
pub mod x86;

#[cfg(test)]
mod test_support;

pub use dispatch::fatal_fault;
pub use error::InterruptError;
pub use fault::TrapFrame;
pub use hal::InterruptHardware;
pub use installer::{EntryStubs, VectorInstaller};
pub use line::IrqLine;
pub use pic::ChainedPics;
pub use registry::{HandlerRegistry, IrqHandler};
pub use subsystem::{BootStage, InterruptSubsystem};
pub use table::{DescriptorTable, TableRegister};
pub use vector::{GateFlags, VectorEntry};
