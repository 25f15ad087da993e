use crate::hal::InterruptHardware;
use crate::table::TableRegister;
use core::arch::asm;
use kernel_registers::LoadRegisterUnsafe;
use kernel_registers::cr2::Cr2;

/// The real thing: `lidt`, `out`, `sti`, CR2 and `hlt` on the current CPU.
#[derive(Copy, Clone, Debug, Default)]
pub struct X86Hardware;

impl InterruptHardware for X86Hardware {
    #[inline]
    unsafe fn load_descriptor_table(&self, base: u64, limit: u16) {
        let operand = TableRegister { limit, base }.encode();
        unsafe {
            asm!(
                "lidt [{}]",
                in(reg) operand.as_ptr(),
                options(nostack, preserves_flags, readonly)
            );
        }
    }

    #[inline]
    unsafe fn out_byte(&self, port: u16, value: u8) {
        unsafe {
            asm!(
                "out dx, al",
                in("dx") port,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }

    #[inline]
    unsafe fn enable_interrupts(&self) {
        unsafe { asm!("sti", options(nomem, nostack)) }
    }

    #[inline]
    unsafe fn read_fault_address(&self) -> u64 {
        unsafe { Cr2::load_unsafe() }.fault_address()
    }

    unsafe fn halt(&self) -> ! {
        loop {
            unsafe { asm!("cli", "hlt", options(nomem, nostack)) }
        }
    }
}
