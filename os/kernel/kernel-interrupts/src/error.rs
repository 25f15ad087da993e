/// Errors surfaced by the interrupt subsystem's fallible entry points.
///
/// Interrupt delivery itself never fails; these only cover raw input from
/// trampolines and the once-only global installation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterruptError {
    #[error("IRQ line {0} is out of range (0..=15)")]
    InvalidIrqLine(u8),
    #[error("the interrupt subsystem is already installed")]
    AlreadyInitialized,
    #[error("the interrupt subsystem is not installed yet")]
    NotInstalled,
}
