//! # Runtime entry points
//!
//! The two calls the trampolines make once interrupts are live. IRQs are
//! always expected: run the handler if there is one, acknowledge, return.
//! Faults are always fatal: report, halt, never return.

use crate::fault::{TrapFrame, report};
use crate::hal::InterruptHardware;
use crate::line::IrqLine;
use crate::subsystem::InterruptSubsystem;
use core::fmt::Write;
use log::trace;

impl<H: InterruptHardware> InterruptSubsystem<'_, H> {
    /// Service one hardware interrupt on `line`.
    ///
    /// The registered handler (if any) runs first, then the PICs get their
    /// end-of-interrupt: the secondary chip first when it owns the line, the
    /// primary always.
    pub fn on_irq(&self, line: IrqLine) {
        if !self.registry.dispatch(line) {
            trace!("unhandled {line}");
        }

        // SAFETY: we are the IRQ path of `line`, running at CPL0.
        unsafe { self.pics.end_of_interrupt(&self.hardware, line) };
    }

    /// Report the CPU fault described by `frame` to `sink` and halt.
    pub fn on_fault<W: Write + ?Sized>(&self, frame: TrapFrame, sink: &mut W) -> ! {
        fatal_fault(&self.hardware, frame, sink)
    }
}

/// Fault path that needs nothing but the hardware capability.
///
/// Used by [`InterruptSubsystem::on_fault`], and directly by the trampolines
/// when a fault arrives before the subsystem has been published.
///
/// The report is the only output: the kernel logger shares the debug console
/// with `sink`, so nothing is logged here.
pub fn fatal_fault<H, W>(hardware: &H, frame: TrapFrame, sink: &mut W) -> !
where
    H: InterruptHardware + ?Sized,
    W: Write + ?Sized,
{
    // SAFETY: fault handlers run at CPL0.
    let fault_address = unsafe { hardware.read_fault_address() };

    // Best-effort: a failing sink must not keep us from halting.
    let _ = report(&frame, fault_address, sink);

    // SAFETY: CPL0; halting is the only outcome of a fault.
    unsafe { hardware.halt() }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pic::EOI;
    use crate::registry::HandlerRegistry;
    use crate::table::DescriptorTable;
    use crate::test_support::{HwEvent, RecordingHardware, booted, run_fault, test_stubs};
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn primary_line_acknowledges_primary_only() {
        let hw = RecordingHardware::new();
        let mut table = Box::new(DescriptorTable::new());
        let subsystem = booted(&mut table, &hw);
        hw.reset();

        for line in 0..8 {
            subsystem.on_irq(IrqLine::new(line).unwrap());
        }
        assert_eq!(hw.port_writes(), vec![(0x20, EOI); 8]);
    }

    #[test]
    fn secondary_line_acknowledges_secondary_first() {
        let hw = RecordingHardware::new();
        let mut table = Box::new(DescriptorTable::new());
        let subsystem = booted(&mut table, &hw);

        for line in 8..16 {
            hw.reset();
            subsystem.on_irq(IrqLine::new(line).unwrap());
            assert_eq!(hw.port_writes(), vec![(0xA0, EOI), (0x20, EOI)], "line {line}");
        }
    }

    #[test]
    fn handler_runs_before_acknowledgement() {
        thread_local! {
            static RECORDER: Cell<Option<&'static RecordingHardware>> = const { Cell::new(None) };
        }
        static WRITES_SEEN: AtomicUsize = AtomicUsize::new(usize::MAX);

        fn on_disk() {
            let seen = RECORDER.with(|hw| hw.get().map_or(usize::MAX, |hw| hw.port_writes().len()));
            WRITES_SEEN.store(seen, Ordering::SeqCst);
        }

        let hw: &'static RecordingHardware = Box::leak(Box::new(RecordingHardware::new()));
        RECORDER.with(|cell| cell.set(Some(hw)));
        let mut table = Box::new(DescriptorTable::new());
        let subsystem = booted(&mut table, hw);
        subsystem.register(IrqLine::PRIMARY_ATA, on_disk);
        hw.reset();

        subsystem.on_irq(IrqLine::PRIMARY_ATA);
        assert_eq!(WRITES_SEEN.load(Ordering::SeqCst), 0, "EOI sent before the handler ran");
        assert_eq!(hw.port_writes(), vec![(0xA0, EOI), (0x20, EOI)]);
    }

    #[test]
    fn preloaded_registry_dispatches_after_boot() {
        static TICKS: AtomicUsize = AtomicUsize::new(0);
        fn on_tick() {
            TICKS.fetch_add(1, Ordering::SeqCst);
        }

        let registry = HandlerRegistry::new();
        registry.register(IrqLine::TIMER, on_tick);

        let hw = RecordingHardware::new();
        let mut table = Box::new(DescriptorTable::new());
        let mut subsystem = InterruptSubsystem::with_registry(&mut table, &hw, 0x08, registry);
        unsafe {
            subsystem.boot(&test_stubs());
            subsystem.enable_interrupts();
        }

        subsystem.on_irq(IrqLine::TIMER);
        assert_eq!(TICKS.load(Ordering::SeqCst), 1);
        assert!(subsystem.registry().handler(IrqLine::SECONDARY_ATA).is_none());
    }

    #[test]
    fn fault_reports_then_halts() {
        let hw = RecordingHardware::with_fault_address(0xFFFF_8000_0000_1000);
        let mut table = Box::new(DescriptorTable::new());
        let subsystem = booted(&mut table, &hw);
        hw.reset();

        let frame = TrapFrame {
            vector: 14,
            error_code: 0b10,
            rip: 0x1000,
            rflags: 0x202,
            cs: 0x08,
            rsp: 0x8000,
            ss: 0x10,
        };
        let out = run_fault(|sink| subsystem.on_fault(frame, sink));

        assert_eq!(
            out,
            "Exception (14) occured\n\
             error_code=2\n\
             rip=0x1000\n\
             rflags=0x202\n\
             cs=0x8\n\
             rsp=0x8000\n\
             ss=0x10\n\
             cr2=0xFFFF800000001000\n"
        );
        assert_eq!(hw.events(), vec![HwEvent::Halt]);
    }

    #[test]
    fn fault_without_subsystem_still_halts() {
        let hw = RecordingHardware::new();
        let frame = TrapFrame {
            vector: 99,
            ..TrapFrame::default()
        };
        let out = run_fault(|sink| fatal_fault(&hw, frame, sink));

        assert!(out.starts_with("Exception (99) occured\n"));
        assert_eq!(hw.events(), vec![HwEvent::Halt]);
    }
}
