use super::hardware::X86Hardware;
use super::stubs::entry_stubs;
use crate::dispatch::fatal_fault;
use crate::error::InterruptError;
use crate::fault::TrapFrame;
use crate::line::IrqLine;
use crate::registry::IrqHandler;
use crate::subsystem::InterruptSubsystem;
use crate::table::DescriptorTable;
use core::sync::atomic::{AtomicBool, Ordering};
use kernel_qemu::DebugConsole;
use log::warn;
use spin::Once;

/// The subsystem as wired on the bootstrap CPU.
pub type KernelInterrupts = InterruptSubsystem<'static, X86Hardware>;

/// Backing storage of the loaded vector table. Never moves, never freed.
static mut TABLE: DescriptorTable = DescriptorTable::new();

/// Set by the first [`install`]; the table is handed out exactly once.
static INSTALLING: AtomicBool = AtomicBool::new(false);

/// Published after boot, read by the trampolines.
static INTERRUPTS: Once<KernelInterrupts> = Once::new();

/// Boot the interrupt subsystem on this CPU and enable interrupts.
///
/// Runs the full sequence on the static table, publishes the instance for the
/// trampolines, and only then executes `sti`.
///
/// # Errors
/// [`InterruptError::AlreadyInitialized`] on every call after the first.
///
/// # Safety
/// Must run once, at CPL0, with interrupts disabled, after the GDT that
/// defines `kernel_cs` is loaded.
pub unsafe fn install(kernel_cs: u16) -> Result<&'static KernelInterrupts, InterruptError> {
    if INSTALLING.swap(true, Ordering::AcqRel) {
        return Err(InterruptError::AlreadyInitialized);
    }

    // SAFETY: `INSTALLING` makes this the only reference ever taken.
    let table = unsafe { &mut *(&raw mut TABLE) };
    let interrupts = INTERRUPTS.call_once(|| {
        let mut subsystem = InterruptSubsystem::new(table, X86Hardware, kernel_cs);
        unsafe { subsystem.boot(&entry_stubs()) };
        subsystem
    });

    unsafe { interrupts.enable_interrupts() };
    Ok(interrupts)
}

/// The published instance, once [`install`] has run.
#[must_use]
pub fn installed() -> Option<&'static KernelInterrupts> {
    INTERRUPTS.get()
}

/// Register a driver's handler on the global instance.
///
/// # Errors
/// [`InterruptError::NotInstalled`] before [`install`].
pub fn register_irq_handler(line: IrqLine, handler: IrqHandler) -> Result<(), InterruptError> {
    installed()
        .ok_or(InterruptError::NotInstalled)?
        .register(line, handler);
    Ok(())
}

/// Called by `fault_common` with the frame it built.
pub(super) extern "C" fn fault_entry(frame: &TrapFrame) -> ! {
    let mut console = DebugConsole::new();
    match INTERRUPTS.get() {
        Some(interrupts) => interrupts.on_fault(*frame, &mut console),
        // Faulted during boot, before the instance was published.
        None => fatal_fault(&X86Hardware, *frame, &mut console),
    }
}

/// Called by `irq_common` with the line number the stub loaded.
pub(super) extern "C" fn irq_entry(line: u64) {
    let Some(interrupts) = INTERRUPTS.get() else {
        return;
    };

    match u8::try_from(line)
        .map_err(|_| InterruptError::InvalidIrqLine(u8::MAX))
        .and_then(IrqLine::try_from)
    {
        Ok(line) => interrupts.on_irq(line),
        Err(e) => warn!("dropping IRQ entry for line {line}: {e}"),
    }
}
