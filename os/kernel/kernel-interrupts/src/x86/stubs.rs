//! Entry trampolines.
//!
//! **Fault stubs** normalise the stack so every vector looks the same (a zero
//! is pushed where the CPU does not supply an error code), push the vector
//! number and jump to [`fault_common`]. That copies the CPU frame into a
//! [`TrapFrame`](crate::fault::TrapFrame) laid out in declared order and
//! calls the Rust fault entry with a pointer to it. Nothing returns.
//!
//! ```text
//!  on entry to fault_common       TrapFrame built below it
//!  [rsp + 48]  ss                 [rsp + 48]  ss
//!  [rsp + 40]  rsp                [rsp + 40]  rsp
//!  [rsp + 32]  rflags             [rsp + 32]  cs
//!  [rsp + 24]  cs                 [rsp + 24]  rflags
//!  [rsp + 16]  rip                [rsp + 16]  rip
//!  [rsp +  8]  error code / 0     [rsp +  8]  error code
//!  [rsp +  0]  vector             [rsp +  0]  vector
//! ```
//!
//! **IRQ stubs** save `rdi`, load the line number into it and jump to
//! [`irq_common`], which saves the remaining caller-saved registers, aligns
//! the stack for the SysV call, calls the Rust IRQ entry and `iretq`s.

use super::global::{fault_entry, irq_entry};
use crate::installer::{EntryStubs, FAULT_VECTORS, IRQ_VECTORS};
use core::arch::naked_asm;

macro_rules! fault_stub {
    ($name:ident, $vector:literal) => {
        #[unsafe(naked)]
        extern "C" fn $name() {
            naked_asm!(
                "push 0",
                "push {vector}",
                "jmp {common}",
                vector = const $vector,
                common = sym fault_common,
            )
        }
    };
    ($name:ident, $vector:literal, error_code) => {
        #[unsafe(naked)]
        extern "C" fn $name() {
            naked_asm!(
                "push {vector}",
                "jmp {common}",
                vector = const $vector,
                common = sym fault_common,
            )
        }
    };
}

macro_rules! irq_stub {
    ($name:ident, $line:literal) => {
        #[unsafe(naked)]
        extern "C" fn $name() {
            naked_asm!(
                "push rdi",
                "mov edi, {line}",
                "jmp {common}",
                line = const $line,
                common = sym irq_common,
            )
        }
    };
}

#[rustfmt::skip]
#[unsafe(naked)]
extern "C" fn fault_common() {
    naked_asm!(
        "cld",
        "sub rsp, 56",
        "mov rax, [rsp + 56]",  "mov [rsp + 0], rax",   // vector
        "mov rax, [rsp + 64]",  "mov [rsp + 8], rax",   // error code
        "mov rax, [rsp + 72]",  "mov [rsp + 16], rax",  // rip
        "mov rax, [rsp + 88]",  "mov [rsp + 24], rax",  // rflags
        "mov rax, [rsp + 80]",  "mov [rsp + 32], rax",  // cs
        "mov rax, [rsp + 96]",  "mov [rsp + 40], rax",  // rsp
        "mov rax, [rsp + 104]", "mov [rsp + 48], rax",  // ss
        "mov rdi, rsp",
        // The frame stays above the aligned stack pointer.
        "and rsp, -16",
        "call {entry}",
        "2:",
        "cli",
        "hlt",
        "jmp 2b",
        entry = sym fault_entry,
    )
}

#[rustfmt::skip]
#[unsafe(naked)]
extern "C" fn irq_common() {
    naked_asm!(
        "push rax", "push rcx", "push rdx", "push rsi",
        "push r8", "push r9", "push r10", "push r11",
        "push rbp",
        "mov rbp, rsp",
        "and rsp, -16",
        "cld",
        "call {entry}",
        "mov rsp, rbp",
        "pop rbp",
        "pop r11", "pop r10", "pop r9", "pop r8",
        "pop rsi", "pop rdx", "pop rcx", "pop rax",
        "pop rdi",
        "iretq",
        entry = sym irq_entry,
    )
}

fault_stub!(fault_stub_0, 0);
fault_stub!(fault_stub_1, 1);
fault_stub!(fault_stub_2, 2);
fault_stub!(fault_stub_3, 3);
fault_stub!(fault_stub_4, 4);
fault_stub!(fault_stub_5, 5);
fault_stub!(fault_stub_6, 6);
fault_stub!(fault_stub_7, 7);
fault_stub!(fault_stub_8, 8, error_code);
fault_stub!(fault_stub_9, 9);
fault_stub!(fault_stub_10, 10, error_code);
fault_stub!(fault_stub_11, 11, error_code);
fault_stub!(fault_stub_12, 12, error_code);
fault_stub!(fault_stub_13, 13, error_code);
fault_stub!(fault_stub_14, 14, error_code);
fault_stub!(fault_stub_15, 15);
fault_stub!(fault_stub_16, 16);
fault_stub!(fault_stub_17, 17, error_code);
fault_stub!(fault_stub_18, 18);
fault_stub!(fault_stub_19, 19);
fault_stub!(fault_stub_20, 20);
fault_stub!(fault_stub_21, 21, error_code);
fault_stub!(fault_stub_22, 22);
fault_stub!(fault_stub_23, 23);
fault_stub!(fault_stub_24, 24);
fault_stub!(fault_stub_25, 25);
fault_stub!(fault_stub_26, 26);
fault_stub!(fault_stub_27, 27);
fault_stub!(fault_stub_28, 28);
fault_stub!(fault_stub_29, 29, error_code);
fault_stub!(fault_stub_30, 30, error_code);
fault_stub!(fault_stub_31, 31);

irq_stub!(irq_stub_0, 0);
irq_stub!(irq_stub_1, 1);
irq_stub!(irq_stub_2, 2);
irq_stub!(irq_stub_3, 3);
irq_stub!(irq_stub_4, 4);
irq_stub!(irq_stub_5, 5);
irq_stub!(irq_stub_6, 6);
irq_stub!(irq_stub_7, 7);
irq_stub!(irq_stub_8, 8);
irq_stub!(irq_stub_9, 9);
irq_stub!(irq_stub_10, 10);
irq_stub!(irq_stub_11, 11);
irq_stub!(irq_stub_12, 12);
irq_stub!(irq_stub_13, 13);
irq_stub!(irq_stub_14, 14);
irq_stub!(irq_stub_15, 15);

type Stub = extern "C" fn();

#[rustfmt::skip]
const FAULT_STUBS: [Stub; FAULT_VECTORS] = [
    fault_stub_0, fault_stub_1, fault_stub_2, fault_stub_3,
    fault_stub_4, fault_stub_5, fault_stub_6, fault_stub_7,
    fault_stub_8, fault_stub_9, fault_stub_10, fault_stub_11,
    fault_stub_12, fault_stub_13, fault_stub_14, fault_stub_15,
    fault_stub_16, fault_stub_17, fault_stub_18, fault_stub_19,
    fault_stub_20, fault_stub_21, fault_stub_22, fault_stub_23,
    fault_stub_24, fault_stub_25, fault_stub_26, fault_stub_27,
    fault_stub_28, fault_stub_29, fault_stub_30, fault_stub_31,
];

#[rustfmt::skip]
const IRQ_STUBS: [Stub; IRQ_VECTORS] = [
    irq_stub_0, irq_stub_1, irq_stub_2, irq_stub_3,
    irq_stub_4, irq_stub_5, irq_stub_6, irq_stub_7,
    irq_stub_8, irq_stub_9, irq_stub_10, irq_stub_11,
    irq_stub_12, irq_stub_13, irq_stub_14, irq_stub_15,
];

/// Addresses of the built-in trampolines, ready for
/// [`InterruptSubsystem::boot`](crate::subsystem::InterruptSubsystem::boot).
#[must_use]
pub fn entry_stubs() -> EntryStubs {
    EntryStubs {
        faults: FAULT_STUBS.map(|stub| stub as usize as u64),
        irqs: IRQ_STUBS.map(|stub| stub as usize as u64),
    }
}
