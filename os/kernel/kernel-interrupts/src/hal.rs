//! # Hardware access capability
//!
//! Every privileged instruction the subsystem needs goes through
//! [`InterruptHardware`]. The kernel uses the `x86` implementation
//! ([`crate::x86::X86Hardware`] with the `x86` feature); tests substitute a
//! recorder so port writes and table loads can be asserted on.

/// The narrow set of privileged operations the interrupt subsystem performs.
pub trait InterruptHardware {
    /// Point the CPU at a new vector table (`lidt`).
    ///
    /// # Safety
    /// Must run at CPL0. The memory at `base` must hold `limit + 1` bytes of
    /// valid gate descriptors for as long as the table stays loaded.
    unsafe fn load_descriptor_table(&self, base: u64, limit: u16);

    /// Write one byte to an I/O port (`out dx, al`).
    ///
    /// # Safety
    /// Must run at CPL0 (or with I/O permission for `port`), and the write
    /// must follow the protocol of the device decoding `port`.
    unsafe fn out_byte(&self, port: u16, value: u8);

    /// Allow maskable interrupts (`sti`).
    ///
    /// # Safety
    /// The vector table and the interrupt controller must be fully set up;
    /// anything else routes IRQs into unconfigured slots.
    unsafe fn enable_interrupts(&self);

    /// Sample the page-fault linear address register (CR2).
    ///
    /// # Safety
    /// Must run at CPL0.
    unsafe fn read_fault_address(&self) -> u64;

    /// Stop the CPU for good.
    ///
    /// # Safety
    /// Must run at CPL0. Nothing after this call executes.
    unsafe fn halt(&self) -> !;
}

impl<H: InterruptHardware + ?Sized> InterruptHardware for &H {
    #[inline]
    unsafe fn load_descriptor_table(&self, base: u64, limit: u16) {
        unsafe { (**self).load_descriptor_table(base, limit) }
    }

    #[inline]
    unsafe fn out_byte(&self, port: u16, value: u8) {
        unsafe { (**self).out_byte(port, value) }
    }

    #[inline]
    unsafe fn enable_interrupts(&self) {
        unsafe { (**self).enable_interrupts() }
    }

    #[inline]
    unsafe fn read_fault_address(&self) -> u64 {
        unsafe { (**self).read_fault_address() }
    }

    #[inline]
    unsafe fn halt(&self) -> ! {
        unsafe { (**self).halt() }
    }
}
