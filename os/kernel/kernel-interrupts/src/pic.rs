//! # Legacy 8259 PIC pair
//!
//! ```text
//!   IRQ 8..=15 ──▶ ┌───────────┐
//!                  │ secondary │──┐
//!                  └───────────┘  │ (primary line 2)
//!   IRQ 0..=7  ──▶ ┌───────────┐◀─┘
//!                  │  primary  │──▶ CPU INTR
//!                  └───────────┘
//! ```
//!
//! Out of reset both chips deliver on vectors that collide with CPU
//! exceptions (primary on 0x08..0x0F), so they are re-initialized with the
//! ICW1..ICW4 sequence to start at 32 and 40.
//!
//! An IRQ from the secondary chip is in service on *both* chips: the
//! secondary's own line and the cascade line on the primary. Both must be
//! acknowledged, secondary first, or the cascade line stays blocked.

use crate::hal::InterruptHardware;
use crate::line::IrqLine;
use log::{debug, trace};

/// ICW1: start initialization, cascade mode, ICW4 follows.
const ICW1_INIT: u8 = 0x11;

/// ICW4: 8086/88 mode.
const ICW4_8086: u8 = 0x01;

/// OCW1 with every bit clear: all lines unmasked.
const UNMASK_ALL: u8 = 0x00;

/// OCW2: non-specific end of interrupt.
pub const EOI: u8 = 0x20;

/// Fixed wiring of one 8259 chip.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Chip {
    pub command: u16,
    pub data: u16,
    /// Vector of line 0 on this chip after remapping (ICW2).
    pub vector_offset: u8,
    /// ICW3: a line bitmask on the primary, the cascade identity on the secondary.
    pub cascade: u8,
}

/// Primary chip: IRQ 0..=7 on vectors 32..=39, secondary attached to line 2.
pub const PRIMARY: Chip = Chip {
    command: 0x20,
    data: 0x21,
    vector_offset: 32,
    cascade: 0b0000_0100,
};

/// Secondary chip: IRQ 8..=15 on vectors 40..=47, cascade identity 2.
pub const SECONDARY: Chip = Chip {
    command: 0xA0,
    data: 0xA1,
    vector_offset: 40,
    cascade: 2,
};

/// The cascaded PIC pair as wired on every PC.
///
/// Holds no state of its own; the chips are the only record of their
/// configuration.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ChainedPics {
    pub primary: Chip,
    pub secondary: Chip,
}

impl Default for ChainedPics {
    fn default() -> Self {
        Self::LEGACY
    }
}

impl ChainedPics {
    pub const LEGACY: Self = Self {
        primary: PRIMARY,
        secondary: SECONDARY,
    };

    /// Reinitialize both chips onto vectors 32..=47 and unmask every line.
    ///
    /// The chips are walked in lockstep, one ICW at a time: each chip sees
    /// ICW1, ICW2 (offset), ICW3 (cascade) and ICW4 (mode) in that order, and
    /// unmasking is the very last write to either chip.
    ///
    /// # Safety
    /// Must run at CPL0 with interrupts disabled.
    pub unsafe fn remap<H: InterruptHardware>(&self, hardware: &H) {
        let chips = [self.primary, self.secondary];
        unsafe {
            for chip in chips {
                hardware.out_byte(chip.command, ICW1_INIT);
            }
            for chip in chips {
                hardware.out_byte(chip.data, chip.vector_offset);
            }
            for chip in chips {
                hardware.out_byte(chip.data, chip.cascade);
            }
            for chip in chips {
                hardware.out_byte(chip.data, ICW4_8086);
            }
            for chip in chips {
                hardware.out_byte(chip.data, UNMASK_ALL);
            }
        }
        debug!(
            "PIC remapped: primary at {}, secondary at {}, all lines unmasked",
            self.primary.vector_offset, self.secondary.vector_offset
        );
    }

    /// Acknowledge `line`: secondary chip first if it owns the line, then
    /// always the primary.
    ///
    /// # Safety
    /// Must run at CPL0 from the handler of `line`.
    pub unsafe fn end_of_interrupt<H: InterruptHardware>(&self, hardware: &H, line: IrqLine) {
        trace!("EOI {line}");
        unsafe {
            if line.is_secondary() {
                hardware.out_byte(self.secondary.command, EOI);
            }
            hardware.out_byte(self.primary.command, EOI);
        }
    }
}
