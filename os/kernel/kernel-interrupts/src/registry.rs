use crate::line::IrqLine;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A driver's interrupt handler: no arguments, no result.
pub type IrqHandler = fn();

/// Maps each of the 16 PIC lines to an optional [`IrqHandler`].
///
/// Each slot is one atomic word holding the handler's address (0 = empty).
/// Registration is a single release store and dispatch a single acquire
/// load, so a handler registered from boot code while interrupts are live is
/// either seen whole or not at all. No lock is taken on the IRQ path.
pub struct HandlerRegistry {
    slots: [AtomicUsize; IrqLine::COUNT],
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// A registry with no handlers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicUsize::new(0) }; IrqLine::COUNT],
        }
    }

    /// Install `handler` for `line`, replacing whatever was there.
    pub fn register(&self, line: IrqLine, handler: IrqHandler) {
        self.slots[line.index()].store(handler as usize, Ordering::Release);
    }

    /// The handler currently registered for `line`, if any.
    #[must_use]
    pub fn handler(&self, line: IrqLine) -> Option<IrqHandler> {
        match self.slots[line.index()].load(Ordering::Acquire) {
            0 => None,
            // SAFETY: non-zero slot values are only ever stored by `register`,
            // from a valid `fn()`.
            addr => Some(unsafe { core::mem::transmute::<usize, IrqHandler>(addr) }),
        }
    }

    /// Run the handler for `line` synchronously. Returns whether one ran.
    ///
    /// An empty line is not an error.
    pub fn dispatch(&self, line: IrqLine) -> bool {
        self.handler(line).is_some_and(|handler| {
            handler();
            true
        })
    }
}
