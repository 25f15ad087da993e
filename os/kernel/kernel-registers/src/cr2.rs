use crate::LoadRegisterUnsafe;

/// CR2: Page-Fault Linear Address.
///
/// The CPU latches the faulting linear address here when it raises `#PF`.
/// The value is only meaningful right after a page fault; for every other
/// exception it still holds whatever the last page fault left behind.
///
/// The register is architecturally 64 bits wide in long mode and is read
/// in full.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[repr(transparent)]
pub struct Cr2(u64);

impl Cr2 {
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u64 {
        self.0
    }

    /// The faulting linear address.
    #[inline]
    #[must_use]
    pub const fn fault_address(self) -> u64 {
        self.0
    }
}

#[cfg(feature = "asm")]
impl LoadRegisterUnsafe for Cr2 {
    unsafe fn load_unsafe() -> Self {
        let mut cr2: u64;
        unsafe {
            core::arch::asm!("mov {}, cr2", out(reg) cr2, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(cr2)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keeps_the_upper_half() {
        let cr2 = Cr2::from_bits(0xFFFF_8000_DEAD_BEEF);
        assert_eq!(cr2.fault_address(), 0xFFFF_8000_DEAD_BEEF);
        assert_eq!(cr2.into_bits() >> 32, 0xFFFF_8000);
    }
}
