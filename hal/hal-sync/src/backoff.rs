use crate::SyncError;
use core::hint::spin_loop;

/// Retries of one `lock()` call after which possible livelock is reported.
pub const CONTENTION_WARN_SPINS: u32 = 1 << 20;

/// Per-call spin bookkeeping for blocking acquisition loops.
pub struct Backoff {
    cell: *const (),
    spins: u32,
}

impl Backoff {
    #[inline]
    pub const fn new<T>(cell: &T) -> Self {
        Self {
            cell: core::ptr::from_ref(cell).cast(),
            spins: 0,
        }
    }

    /// Called after a failed attempt, before the next one.
    #[inline]
    pub fn snooze(&mut self) {
        self.spins = self.spins.saturating_add(1);
        if self.spins == CONTENTION_WARN_SPINS {
            log::warn!(
                "spinlock {:p} still contended after {} attempts",
                self.cell,
                self.spins
            );
        }
        spin_loop();
    }
}

/// Up to `attempts` calls of `attempt`, for the lock at `lock`.
///
/// # Errors
/// [`SyncError::Busy`] if no attempt succeeded.
pub fn try_for(
    lock: *const (),
    attempts: usize,
    mut attempt: impl FnMut() -> bool,
) -> Result<(), SyncError> {
    for _ in 0..attempts {
        if attempt() {
            return Ok(());
        }
        spin_loop();
    }
    log::trace!("lock {lock:p} busy after {attempts} attempts");
    Err(SyncError::Busy { attempts })
}
