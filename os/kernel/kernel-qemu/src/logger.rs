use crate::qemu_trace;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Once;

pub struct QemuLogger {
    max_level: LevelFilter,
}

static LOGGER: Once<QemuLogger> = Once::new();

impl QemuLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Install this logger as the global `log` backend.
    ///
    /// Call once during early init, before the interrupt subsystem boots so
    /// its progress is visible.
    ///
    /// # Errors
    /// Fails if another logger has already been installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        let logger: &'static Self = LOGGER.call_once(|| self);
        log::set_logger(logger)?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for QemuLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // "[LEVEL] target: message\n"
        qemu_trace!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}
