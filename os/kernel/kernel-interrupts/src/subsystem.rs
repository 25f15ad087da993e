//! # Interrupt subsystem
//!
//! [`InterruptSubsystem`] owns everything the interrupt path touches: the
//! vector table, the IRQ handler registry, the PIC wiring and the hardware
//! capability. Boot happens through it in one fixed order:
//!
//! ```text
//! Uninitialized
//!   └─ load_table()             clear + lidt
//! TableLoaded
//!   └─ install_fault_vectors()  slots 0..=31
//! FaultVectorsInstalled
//!   └─ remap_controller()       PICs onto 32..=47
//! ControllerRemapped
//!   └─ install_irq_vectors()    slots 32..=47
//! IrqVectorsInstalled
//!   └─ enable_interrupts()      sti
//! InterruptsEnabled
//! ```
//!
//! There is no way back and no teardown. Out-of-order calls are a
//! programming error: debug builds assert on them, release builds do what
//! they are told and the hardware misbehaves.
//!
//! After boot the only traffic is [`on_irq`](InterruptSubsystem::on_irq) and
//! [`on_fault`](InterruptSubsystem::on_fault), called by the trampolines.

use crate::hal::InterruptHardware;
use crate::installer::{EntryStubs, FAULT_VECTORS, IRQ_VECTORS, VectorInstaller};
use crate::line::IrqLine;
use crate::pic::ChainedPics;
use crate::registry::{HandlerRegistry, IrqHandler};
use crate::table::DescriptorTable;
use core::sync::atomic::{AtomicBool, Ordering};
use log::{debug, info};

/// Where the boot sequence currently stands.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum BootStage {
    Uninitialized,
    TableLoaded,
    FaultVectorsInstalled,
    ControllerRemapped,
    IrqVectorsInstalled,
    InterruptsEnabled,
}

pub struct InterruptSubsystem<'t, H> {
    pub(crate) table: &'t mut DescriptorTable,
    pub(crate) registry: HandlerRegistry,
    pub(crate) pics: ChainedPics,
    pub(crate) hardware: H,
    selector: u16,
    stage: BootStage,
    enabled: AtomicBool,
}

impl<'t, H: InterruptHardware> InterruptSubsystem<'t, H> {
    /// Wrap `table` and `hardware`. Nothing touches the CPU until
    /// [`load_table`](Self::load_table).
    ///
    /// `selector` is the kernel code segment selector from the GDT; it is
    /// written verbatim into every gate.
    pub fn new(table: &'t mut DescriptorTable, hardware: H, selector: u16) -> Self {
        Self::with_registry(table, hardware, selector, HandlerRegistry::new())
    }

    /// Like [`new`](Self::new), with a pre-populated handler registry.
    pub fn with_registry(
        table: &'t mut DescriptorTable,
        hardware: H,
        selector: u16,
        registry: HandlerRegistry,
    ) -> Self {
        Self {
            table,
            registry,
            pics: ChainedPics::LEGACY,
            hardware,
            selector,
            stage: BootStage::Uninitialized,
            enabled: AtomicBool::new(false),
        }
    }

    /// Zero the table and load it into the IDTR.
    ///
    /// # Safety
    /// Must run at CPL0 with interrupts disabled, and the table passed to
    /// [`new`](Self::new) must never move while loaded.
    pub unsafe fn load_table(&mut self) {
        self.expect_stage(BootStage::Uninitialized);
        self.table.clear();
        unsafe { self.table.install(&self.hardware) };
        self.stage = BootStage::TableLoaded;
    }

    /// Wire CPU exception vectors 0..=31 to `stubs`.
    pub fn install_fault_vectors(&mut self, stubs: &[u64; FAULT_VECTORS]) {
        self.expect_stage(BootStage::TableLoaded);
        self.table.install_fault_vectors(stubs, self.selector);
        self.stage = BootStage::FaultVectorsInstalled;
    }

    /// Move the PICs onto vectors 32..=47 and unmask every line.
    ///
    /// # Safety
    /// Must run at CPL0 with interrupts disabled.
    pub unsafe fn remap_controller(&mut self) {
        self.expect_stage(BootStage::FaultVectorsInstalled);
        unsafe { self.pics.remap(&self.hardware) };
        self.stage = BootStage::ControllerRemapped;
    }

    /// Wire IRQ vectors 32..=47 to `stubs`.
    pub fn install_irq_vectors(&mut self, stubs: &[u64; IRQ_VECTORS]) {
        self.expect_stage(BootStage::ControllerRemapped);
        self.table.install_irq_vectors(stubs, self.selector);
        self.stage = BootStage::IrqVectorsInstalled;
    }

    /// Run every boot step up to, but not including, enabling interrupts.
    ///
    /// Enabling is left to the caller so the instance can first be made
    /// reachable from the trampolines.
    ///
    /// # Safety
    /// Same as [`load_table`](Self::load_table) and
    /// [`remap_controller`](Self::remap_controller).
    pub unsafe fn boot(&mut self, stubs: &EntryStubs) {
        unsafe { self.load_table() };
        self.install_fault_vectors(&stubs.faults);
        unsafe { self.remap_controller() };
        self.install_irq_vectors(&stubs.irqs);
        info!("interrupt vectors installed, selector={:#06x}", self.selector);
    }

    /// Let the CPU take maskable interrupts.
    ///
    /// # Safety
    /// Must run at CPL0, after [`boot`](Self::boot) (or the five individual
    /// steps), and only once the trampolines can reach this instance.
    pub unsafe fn enable_interrupts(&self) {
        self.expect_stage(BootStage::IrqVectorsInstalled);
        unsafe { self.hardware.enable_interrupts() };
        self.enabled.store(true, Ordering::Release);
        info!("interrupts enabled");
    }

    /// Register `handler` for `line`, replacing any previous one.
    pub fn register(&self, line: IrqLine, handler: IrqHandler) {
        debug!("registering handler for {line}");
        self.registry.register(line, handler);
    }

    #[must_use]
    pub fn stage(&self) -> BootStage {
        if self.enabled.load(Ordering::Acquire) {
            BootStage::InterruptsEnabled
        } else {
            self.stage
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn table(&self) -> &DescriptorTable {
        &*self.table
    }

    #[must_use]
    pub const fn hardware(&self) -> &H {
        &self.hardware
    }

    #[must_use]
    pub const fn selector(&self) -> u16 {
        self.selector
    }

    #[inline]
    fn expect_stage(&self, expected: BootStage) {
        debug_assert_eq!(self.stage(), expected, "interrupt boot steps called out of order");
    }
}
