//! # Vector entry codec
//!
//! One x86-64 IDT gate descriptor is exactly 16 bytes. The CPU walks these
//! bytes directly, so the layout is spelled out field by field over a byte
//! buffer instead of trusting a `repr(packed)` struct to get it right:
//!
//! ```text
//!  byte  0..2   offset[15:0]
//!  byte  2..4   segment selector
//!  byte  4      IST index (bits 0..3), bits 3..8 zero
//!  byte  5      | P | DPL(2) | S(0) | type(4) |
//!  byte  6..8   offset[31:16]
//!  byte  8..12  offset[63:32]
//!  byte 12..16  reserved, zero
//! ```
//!
//! All multi-byte fields are little-endian (Intel SDM Vol. 3A, §6.14.1).

use bitfield_struct::bitfield;

/// Size of one encoded gate descriptor in bytes.
pub const VECTOR_ENTRY_SIZE: usize = 16;

/// One encoded gate descriptor, as the CPU reads it.
pub type RawVectorEntry = [u8; VECTOR_ENTRY_SIZE];

/// The type/attribute byte of a gate descriptor (byte 5).
#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct GateFlags {
    /// **Type**: 0xE = 64-bit interrupt gate, 0xF = 64-bit trap gate.
    #[bits(4)]
    pub gate_type: u8,

    /// **S**: must be `0` for interrupt and trap gates.
    pub storage_segment: bool,

    /// **DPL**: lowest privilege level allowed to reach this gate via `int n`.
    #[bits(2)]
    pub dpl: u8,

    /// **P**: the CPU raises `#NP` for gates without it.
    pub present: bool,
}

impl GateFlags {
    pub const INTERRUPT_GATE: u8 = 0xE;
    pub const TRAP_GATE: u8 = 0xF;

    /// Present, ring 0, 64-bit interrupt gate (`0x8E`).
    ///
    /// Interrupt gates clear `IF` on entry, which is what keeps IRQ handling
    /// serialized on a single core.
    #[inline]
    #[must_use]
    pub const fn kernel_interrupt_gate() -> Self {
        Self::new()
            .with_gate_type(Self::INTERRUPT_GATE)
            .with_storage_segment(false)
            .with_dpl(0)
            .with_present(true)
    }
}

/// Decoded view of one gate descriptor.
///
/// The handler address is kept split the way the hardware stores it; use
/// [`VectorEntry::handler_address`] to reassemble it.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct VectorEntry {
    pub offset_low: u16,
    pub selector: u16,
    /// Interrupt Stack Table index; 0 keeps the current stack.
    pub ist: u8,
    pub flags: GateFlags,
    pub offset_mid: u16,
    pub offset_high: u32,
}

impl VectorEntry {
    /// An all-zero, non-present entry.
    pub const MISSING: Self = Self {
        offset_low: 0,
        selector: 0,
        ist: 0,
        flags: GateFlags::new(),
        offset_mid: 0,
        offset_high: 0,
    };

    /// Build an entry pointing at `handler`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(handler: u64, selector: u16, flags: GateFlags) -> Self {
        Self {
            offset_low: (handler & 0xFFFF) as u16,
            selector,
            ist: 0,
            flags,
            offset_mid: ((handler >> 16) & 0xFFFF) as u16,
            offset_high: (handler >> 32) as u32,
        }
    }

    /// Reassemble the 64-bit handler address from its three fields.
    #[inline]
    #[must_use]
    pub const fn handler_address(&self) -> u64 {
        (self.offset_low as u64)
            | ((self.offset_mid as u64) << 16)
            | ((self.offset_high as u64) << 32)
    }

    #[inline]
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.flags.present()
    }

    /// Encode into the 16-byte hardware layout. Reserved bits are always zero.
    #[must_use]
    pub fn encode(&self) -> RawVectorEntry {
        let mut raw = [0u8; VECTOR_ENTRY_SIZE];
        raw[0..2].copy_from_slice(&self.offset_low.to_le_bytes());
        raw[2..4].copy_from_slice(&self.selector.to_le_bytes());
        raw[4] = self.ist & 0b111;
        raw[5] = self.flags.into_bits();
        raw[6..8].copy_from_slice(&self.offset_mid.to_le_bytes());
        raw[8..12].copy_from_slice(&self.offset_high.to_le_bytes());
        raw
    }

    /// Decode the 16-byte hardware layout. Reserved bytes are ignored.
    #[must_use]
    pub const fn decode(raw: &RawVectorEntry) -> Self {
        Self {
            offset_low: u16::from_le_bytes([raw[0], raw[1]]),
            selector: u16::from_le_bytes([raw[2], raw[3]]),
            ist: raw[4] & 0b111,
            flags: GateFlags::from_bits(raw[5]),
            offset_mid: u16::from_le_bytes([raw[6], raw[7]]),
            offset_high: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kernel_interrupt_gate_is_0x8e() {
        assert_eq!(GateFlags::kernel_interrupt_gate().into_bits(), 0x8E);
    }

    #[test]
    fn encodes_hardware_layout() {
        let entry = VectorEntry::new(
            0xFFFF_8000_1234_5678,
            0x08,
            GateFlags::kernel_interrupt_gate(),
        );
        assert_eq!(
            entry.encode(),
            [
                0x78, 0x56, // offset[15:0]
                0x08, 0x00, // selector
                0x00, // IST
                0x8E, // P=1 DPL=0 interrupt gate
                0x34, 0x12, // offset[31:16]
                0x00, 0x80, 0xFF, 0xFF, // offset[63:32]
                0x00, 0x00, 0x00, 0x00, // reserved
            ]
        );
    }

    #[test]
    fn decode_ignores_reserved_bytes() {
        let flags = GateFlags::kernel_interrupt_gate();
        let mut raw = VectorEntry::new(0xDEAD_BEEF, 0x28, flags).encode();
        raw[4] |= 0xF8;
        raw[12..16].copy_from_slice(&[0xAA; 4]);

        let entry = VectorEntry::decode(&raw);
        assert_eq!(entry.handler_address(), 0xDEAD_BEEF);
        assert_eq!(entry.ist, 0);
        assert_eq!(entry.encode()[12..16], [0; 4]);
    }

    #[test]
    fn missing_entry_encodes_to_zero() {
        assert_eq!(VectorEntry::MISSING.encode(), [0; VECTOR_ENTRY_SIZE]);
        assert!(!VectorEntry::decode(&[0; VECTOR_ENTRY_SIZE]).is_present());
    }
}
