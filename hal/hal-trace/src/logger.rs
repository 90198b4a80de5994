use core::fmt::Write;
use hal_sync::arch::Native;
use hal_sync::{LockStrategy, NativeLock, SpinMutex};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// A [`Log`] backend writing `"[LEVEL] target: message\n"` lines into `W`.
pub struct SinkLogger<W, S = NativeLock> {
    max_level: LevelFilter,
    sink: SpinMutex<W, S>,
}

impl<W, S> SinkLogger<W, S> {
    #[must_use]
    pub const fn new(max_level: LevelFilter, sink: W) -> Self {
        Self {
            max_level,
            sink: SpinMutex::with_strategy(sink),
        }
    }

    #[inline]
    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

impl<W, S: LockStrategy> SinkLogger<W, S> {
    /// Runs `f` on the sink with the logger's lock held and interrupts
    /// masked, e.g. to flush a buffer or swap the underlying peripheral.
    ///
    /// Masked like [`log`](Log::log): a handler logging on this core must
    /// not find the lock held by the code it preempted.
    pub fn with_sink<U>(&self, f: impl FnOnce(&mut W) -> U) -> U {
        let mut sink = self.sink.lock_irq::<Native>();
        f(&mut sink)
    }
}

impl<W, S> SinkLogger<W, S>
where
    W: Write + Send + 'static,
    S: LockStrategy + 'static,
{
    /// Installs this logger as the global `log` backend. Call once during
    /// early init.
    ///
    /// # Errors
    /// [`SetLoggerError`] if a logger was already installed.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl<W, S> Log for SinkLogger<W, S>
where
    W: Write + Send,
    S: LockStrategy,
{
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Masked so a handler logging on this core cannot spin on our lock.
        let mut sink = self.sink.lock_irq::<Native>();

        // Best effort; a failing sink has nowhere to report to.
        let _ = writeln!(sink, "[{}] {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}
