//! # Descriptor table storage
//!
//! Owns the 64 encoded gate descriptors and the table-register record that
//! `lidt` consumes. Only the first 48 slots are ever filled (32 CPU fault
//! vectors and 16 remapped IRQs); the rest stay zeroed and therefore
//! non-present.
//!
//! The CPU keeps fetching gates from this memory after `lidt`, so a loaded
//! table must never move. The kernel keeps it in a `static`.

use crate::hal::InterruptHardware;
use crate::vector::{RawVectorEntry, VECTOR_ENTRY_SIZE, VectorEntry};
use log::debug;

/// Number of slots in the table.
pub const TABLE_ENTRIES: usize = 64;

/// The IDTR contents: `limit` is the byte size minus one, `base` the linear
/// address of slot 0.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct TableRegister {
    pub limit: u16,
    pub base: u64,
}

impl TableRegister {
    pub const EMPTY: Self = Self { limit: 0, base: 0 };

    /// Register record for a table of `entries` descriptors at `base`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn for_table(base: u64, entries: usize) -> Self {
        debug_assert!(entries > 0 && entries * VECTOR_ENTRY_SIZE <= 1 << 16);
        Self {
            limit: (entries * VECTOR_ENTRY_SIZE - 1) as u16,
            base,
        }
    }

    /// The 10-byte pseudo-descriptor `lidt` reads: limit, then base.
    #[must_use]
    pub fn encode(&self) -> [u8; 10] {
        let mut raw = [0u8; 10];
        raw[0..2].copy_from_slice(&self.limit.to_le_bytes());
        raw[2..10].copy_from_slice(&self.base.to_le_bytes());
        raw
    }
}

/// The 64-slot vector table.
#[repr(C, align(16))]
pub struct DescriptorTable {
    entries: [RawVectorEntry; TABLE_ENTRIES],
    register: TableRegister,
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorTable {
    /// A zeroed table; nothing is present and nothing is loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [[0; VECTOR_ENTRY_SIZE]; TABLE_ENTRIES],
            register: TableRegister::EMPTY,
        }
    }

    /// Zero every slot and the register record.
    ///
    /// Must run before any gate is installed.
    pub fn clear(&mut self) {
        self.entries = [[0; VECTOR_ENTRY_SIZE]; TABLE_ENTRIES];
        self.register = TableRegister::EMPTY;
    }

    /// Record this table's address and size and load it into the IDTR.
    ///
    /// From here on the CPU consults this table for every trap and interrupt,
    /// including gates written after the load.
    ///
    /// # Safety
    /// Must run at CPL0, and `self` must stay at its current address for as
    /// long as the table is loaded (in practice: forever, so a `static`).
    pub unsafe fn install<H: InterruptHardware>(&mut self, hardware: &H) {
        let base = self.entries.as_ptr() as u64;
        self.register = TableRegister::for_table(base, TABLE_ENTRIES);
        debug!(
            "loading vector table: base={:#018x} limit={}",
            self.register.base, self.register.limit
        );
        unsafe {
            hardware.load_descriptor_table(self.register.base, self.register.limit);
        }
    }

    /// The register record computed by the last [`install`](Self::install).
    #[inline]
    #[must_use]
    pub const fn register(&self) -> TableRegister {
        self.register
    }

    /// Decode one slot.
    ///
    /// # Panics
    /// If `slot >= TABLE_ENTRIES`.
    #[inline]
    #[must_use]
    pub const fn entry(&self, slot: usize) -> VectorEntry {
        VectorEntry::decode(&self.entries[slot])
    }

    /// The raw bytes of one slot.
    ///
    /// # Panics
    /// If `slot >= TABLE_ENTRIES`.
    #[inline]
    #[must_use]
    pub const fn raw(&self, slot: usize) -> &RawVectorEntry {
        &self.entries[slot]
    }

    /// Overwrite one slot with an encoded entry.
    #[inline]
    pub(crate) fn write(&mut self, slot: usize, entry: &VectorEntry) {
        self.entries[slot] = entry.encode();
    }
}
