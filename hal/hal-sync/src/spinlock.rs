use crate::backoff;
use crate::{LockStrategy, NativeLock, RawLock, RawUnlock, SyncError};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU8, Ordering};

/// Cell value of a free lock.
pub const UNLOCKED: u8 = 0;

/// Cell value of a held lock.
pub const LOCKED: u8 = 1;

/// Observed state of a [`Spinlock`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum LockState {
    Unlocked = UNLOCKED,
    Locked = LOCKED,
}

/// A one-byte binary spinlock.
///
/// The lock is only the cell; it does not own the data it protects. Use
/// [`Mutex`](crate::Mutex) to tie a value to it.
///
/// Not reentrant: calling [`lock`](Self::lock) again from the context that
/// holds the lock spins forever. An interrupt handler must not take a lock
/// that the code it preempted may hold.
#[repr(transparent)]
pub struct Spinlock<S = NativeLock> {
    state: AtomicU8,
    _strategy: PhantomData<fn() -> S>,
}

impl<S> Default for Spinlock<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> core::fmt::Debug for Spinlock<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Spinlock")
            .field("state", &self.state())
            .finish()
    }
}

impl<S> Spinlock<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNLOCKED),
            _strategy: PhantomData,
        }
    }

    /// A lock that starts out held, e.g. until a driver finished its setup.
    #[must_use]
    pub const fn locked() -> Self {
        Self {
            state: AtomicU8::new(LOCKED),
            _strategy: PhantomData,
        }
    }

    /// Snapshot of the cell. Only meaningful as a hint while others contend.
    #[inline]
    #[must_use]
    pub fn state(&self) -> LockState {
        if self.state.load(Ordering::Relaxed) == UNLOCKED {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    }

    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state() == LockState::Locked
    }
}

impl<S: LockStrategy> Spinlock<S> {
    /// Spins until the lock is held by the caller.
    #[inline]
    pub fn lock(&self) {
        S::lock(&self.state);
    }

    /// Single acquisition attempt; never blocks.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> bool {
        S::try_lock(&self.state)
    }

    /// Up to `attempts` calls of [`try_lock`](Self::try_lock).
    ///
    /// # Errors
    /// [`SyncError::Busy`] if every attempt found the lock held.
    pub fn try_lock_for(&self, attempts: usize) -> Result<(), SyncError> {
        backoff::try_for(core::ptr::from_ref(&self.state).cast(), attempts, || {
            self.try_lock()
        })
    }

    /// Releases the lock.
    ///
    /// # Safety
    /// The caller must hold the lock. Unlocking a free lock or a lock held by
    /// another context breaks mutual exclusion for everyone using it.
    #[inline]
    pub unsafe fn unlock(&self) {
        unsafe { S::unlock(&self.state) }
    }
}

impl<S: LockStrategy> RawLock for Spinlock<S> {
    fn raw_lock(&self) {
        self.lock();
    }

    fn raw_try_lock(&self) -> bool {
        self.try_lock()
    }
}

impl<S: LockStrategy> RawUnlock for Spinlock<S> {
    unsafe fn raw_unlock(&self) {
        unsafe { self.unlock() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_one_byte() {
        assert_eq!(size_of::<Spinlock>(), 1);
        assert_eq!(align_of::<Spinlock>(), 1);
    }

    #[test]
    fn initial_states() {
        let free: Spinlock = Spinlock::new();
        let held: Spinlock = Spinlock::locked();
        assert_eq!(free.state(), LockState::Unlocked);
        assert_eq!(held.state(), LockState::Locked);
        assert_eq!(LockState::Locked as u8, LOCKED);
    }

    #[test]
    fn bounded_attempts_report_busy() {
        let held: Spinlock = Spinlock::locked();
        assert_eq!(held.try_lock_for(3), Err(SyncError::Busy { attempts: 3 }));
        assert!(held.is_locked());

        let free: Spinlock = Spinlock::new();
        assert_eq!(free.try_lock_for(1), Ok(()));
        assert!(free.is_locked());
    }
}
