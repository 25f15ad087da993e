use crate::error::InterruptError;
use crate::pic::{PRIMARY, SECONDARY};
use core::fmt;

/// A hardware interrupt-request line of the chained 8259 pair (0..=15).
///
/// Lines 0..=7 belong to the primary chip, 8..=15 to the secondary one,
/// which is cascaded into primary line 2.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct IrqLine(u8);

impl IrqLine {
    /// Number of lines across both chips.
    pub const COUNT: usize = 16;

    pub const TIMER: Self = Self(0);
    pub const KEYBOARD: Self = Self(1);
    pub const PRIMARY_ATA: Self = Self(14);
    pub const SECONDARY_ATA: Self = Self(15);

    #[inline]
    #[must_use]
    pub const fn new(line: u8) -> Option<Self> {
        if (line as usize) < Self::COUNT {
            Some(Self(line))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether the line is wired to the secondary chip.
    #[inline]
    #[must_use]
    pub const fn is_secondary(self) -> bool {
        self.0 >= 8
    }

    /// The vector the line is delivered on once the controller is remapped.
    #[inline]
    #[must_use]
    pub const fn vector(self) -> u8 {
        if self.is_secondary() {
            SECONDARY.vector_offset + (self.0 - 8)
        } else {
            PRIMARY.vector_offset + self.0
        }
    }

    /// All sixteen lines in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..16).map(Self)
    }
}

impl TryFrom<u8> for IrqLine {
    type Error = InterruptError;

    fn try_from(line: u8) -> Result<Self, Self::Error> {
        Self::new(line).ok_or(InterruptError::InvalidIrqLine(line))
    }
}

impl From<IrqLine> for usize {
    fn from(line: IrqLine) -> Self {
        line.index()
    }
}

impl fmt::Display for IrqLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IRQ{}", self.0)
    }
}
