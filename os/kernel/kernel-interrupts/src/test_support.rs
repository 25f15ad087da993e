//! Recording stand-in for the privileged hardware operations.

use crate::hal::InterruptHardware;
use crate::installer::{EntryStubs, FAULT_VECTORS, IRQ_VECTORS};
use crate::subsystem::InterruptSubsystem;
use crate::table::DescriptorTable;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HwEvent {
    LoadTable { base: u64, limit: u16 },
    Out { port: u16, value: u8 },
    EnableInterrupts,
    Halt,
}

#[derive(Default)]
pub struct RecordingHardware {
    events: RefCell<Vec<HwEvent>>,
    fault_address: u64,
}

impl RecordingHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault_address(fault_address: u64) -> Self {
        Self {
            fault_address,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<HwEvent> {
        self.events.borrow().clone()
    }

    pub fn port_writes(&self) -> Vec<(u16, u8)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                HwEvent::Out { port, value } => Some((port, value)),
                _ => None,
            })
            .collect()
    }

    pub fn reset(&self) {
        self.events.borrow_mut().clear();
    }
}

impl InterruptHardware for RecordingHardware {
    unsafe fn load_descriptor_table(&self, base: u64, limit: u16) {
        self.events.borrow_mut().push(HwEvent::LoadTable { base, limit });
    }

    unsafe fn out_byte(&self, port: u16, value: u8) {
        self.events.borrow_mut().push(HwEvent::Out { port, value });
    }

    unsafe fn enable_interrupts(&self) {
        self.events.borrow_mut().push(HwEvent::EnableInterrupts);
    }

    unsafe fn read_fault_address(&self) -> u64 {
        self.fault_address
    }

    unsafe fn halt(&self) -> ! {
        self.events.borrow_mut().push(HwEvent::Halt);
        panic!("halted")
    }
}

/// Distinct, recognisable stub addresses with all three offset fields in use.
pub fn test_stubs() -> EntryStubs {
    let mut faults = [0; FAULT_VECTORS];
    for (vector, addr) in faults.iter_mut().enumerate() {
        *addr = 0xFFFF_FFFF_8020_0000 + vector as u64 * 0x10;
    }
    let mut irqs = [0; IRQ_VECTORS];
    for (line, addr) in irqs.iter_mut().enumerate() {
        *addr = 0xFFFF_FFFF_8030_0000 + line as u64 * 0x10;
    }
    EntryStubs { faults, irqs }
}

/// A subsystem that went through the whole boot sequence.
pub fn booted<'a>(
    table: &'a mut DescriptorTable,
    hardware: &'a RecordingHardware,
) -> InterruptSubsystem<'a, &'a RecordingHardware> {
    let mut subsystem = InterruptSubsystem::new(table, hardware, 0x08);
    unsafe {
        subsystem.boot(&test_stubs());
        subsystem.enable_interrupts();
    }
    subsystem
}

/// Run a fault path to its halt and return what it wrote to the sink.
pub fn run_fault(fault: impl FnOnce(&mut String)) -> String {
    let mut out = String::new();
    let halted = panic::catch_unwind(AssertUnwindSafe(|| fault(&mut out)))
        .expect_err("the fault path returned");
    assert_eq!(halted.downcast_ref::<&str>(), Some(&"halted"));
    out
}
