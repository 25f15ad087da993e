use crate::table::DescriptorTable;
use crate::vector::{GateFlags, VectorEntry};
use log::trace;

/// Number of architecturally defined CPU exception vectors (0..=31).
pub const FAULT_VECTORS: usize = 32;

/// Number of legacy PIC lines, installed at vectors 32..=47.
pub const IRQ_VECTORS: usize = 16;

/// First table slot used for IRQ lines. Matches the primary PIC offset.
pub const IRQ_VECTOR_BASE: usize = FAULT_VECTORS;

/// Addresses of the low-level entry trampolines, one per vector.
///
/// Fault stub `n` must build a [`TrapFrame`](crate::fault::TrapFrame) for
/// vector `n`; IRQ stub `n` must pass line `n` on to the IRQ entry point.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EntryStubs {
    pub faults: [u64; FAULT_VECTORS],
    pub irqs: [u64; IRQ_VECTORS],
}

/// Gate installation on top of a [`DescriptorTable`].
pub trait VectorInstaller {
    /// Point `slot` at `handler`.
    ///
    /// `slot` must be below [`TABLE_ENTRIES`](crate::table::TABLE_ENTRIES);
    /// that is the caller's job, not checked beyond the slice bounds check.
    fn set_gate(&mut self, slot: usize, handler: u64, selector: u16, flags: GateFlags) -> &mut Self;

    /// Install the 32 fault stubs into slots 0..=31 as ring-0 interrupt gates.
    fn install_fault_vectors(&mut self, stubs: &[u64; FAULT_VECTORS], selector: u16) -> &mut Self;

    /// Install the 16 IRQ stubs into slots 32..=47 as ring-0 interrupt gates.
    ///
    /// Only meaningful once the PICs deliver on 32..=47, i.e. after
    /// [`ChainedPics::remap`](crate::pic::ChainedPics::remap).
    fn install_irq_vectors(&mut self, stubs: &[u64; IRQ_VECTORS], selector: u16) -> &mut Self;
}

impl VectorInstaller for DescriptorTable {
    fn set_gate(
        &mut self,
        slot: usize,
        handler: u64,
        selector: u16,
        flags: GateFlags,
    ) -> &mut Self {
        trace!(
            "gate {slot:2}: handler={handler:#018x} selector={selector:#06x} flags={:#04x}",
            flags.into_bits()
        );
        self.write(slot, &VectorEntry::new(handler, selector, flags));
        self
    }

    fn install_fault_vectors(&mut self, stubs: &[u64; FAULT_VECTORS], selector: u16) -> &mut Self {
        for (slot, &handler) in stubs.iter().enumerate() {
            self.set_gate(slot, handler, selector, GateFlags::kernel_interrupt_gate());
        }
        self
    }

    fn install_irq_vectors(&mut self, stubs: &[u64; IRQ_VECTORS], selector: u16) -> &mut Self {
        for (line, &handler) in stubs.iter().enumerate() {
            self.set_gate(
                IRQ_VECTOR_BASE + line,
                handler,
                selector,
                GateFlags::kernel_interrupt_gate(),
            );
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::table::TABLE_ENTRIES;

    const KERNEL_CS: u16 = 0x08;

    fn stubs() -> EntryStubs {
        let mut faults = [0; FAULT_VECTORS];
        for (i, addr) in faults.iter_mut().enumerate() {
            *addr = 0xFFFF_FFFF_8010_0000 + (i as u64) * 0x20;
        }
        let mut irqs = [0; IRQ_VECTORS];
        for (i, addr) in irqs.iter_mut().enumerate() {
            *addr = 0x0000_7FFF_A000_1230 | ((i as u64) << 40);
        }
        EntryStubs { faults, irqs }
    }

    #[test]
    fn every_slot_reassembles_its_address() {
        let stubs = stubs();
        let mut table = Box::new(DescriptorTable::new());
        table
            .install_fault_vectors(&stubs.faults, KERNEL_CS)
            .install_irq_vectors(&stubs.irqs, KERNEL_CS);

        for slot in 0..TABLE_ENTRIES {
            let entry = table.entry(slot);
            let expected = match slot {
                0..32 => stubs.faults[slot],
                32..48 => stubs.irqs[slot - 32],
                _ => 0,
            };
            assert_eq!(entry.handler_address(), expected, "slot {slot}");
        }
    }

    #[test]
    fn installed_gates_are_kernel_interrupt_gates() {
        let stubs = stubs();
        let mut table = Box::new(DescriptorTable::new());
        table
            .install_fault_vectors(&stubs.faults, KERNEL_CS)
            .install_irq_vectors(&stubs.irqs, KERNEL_CS);

        for slot in 0..48 {
            let entry = table.entry(slot);
            assert_eq!(entry.selector, KERNEL_CS);
            assert_eq!(entry.flags.into_bits(), 0x8E);
            assert_eq!(table.raw(slot)[12..16], [0; 4]);
        }
        for slot in 48..TABLE_ENTRIES {
            assert_eq!(table.raw(slot), &[0; 16], "slot {slot} should stay empty");
        }
    }

    #[test]
    fn set_gate_overwrites_slot() {
        let mut table = Box::new(DescriptorTable::new());
        table
            .set_gate(63, u64::MAX, 0x10, GateFlags::kernel_interrupt_gate())
            .set_gate(63, 0x1234, KERNEL_CS, GateFlags::new().with_gate_type(GateFlags::TRAP_GATE));

        let entry = table.entry(63);
        assert_eq!(entry.handler_address(), 0x1234);
        assert_eq!(entry.selector, KERNEL_CS);
        assert!(!entry.is_present());
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn slot_past_the_table_panics() {
        let mut table = Box::new(DescriptorTable::new());
        table.set_gate(TABLE_ENTRIES, 0, KERNEL_CS, GateFlags::kernel_interrupt_gate());
    }
}
