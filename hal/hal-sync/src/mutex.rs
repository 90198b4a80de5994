use crate::backoff;
use crate::{NativeLock, RawLock, RawUnlock, Spinlock, SyncError};
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};

/// A value of type `T` owned by the raw lock `R`.
///
/// The guard returned by [`lock`](Self::lock) is the only way to reach the
/// value while other contexts may hold a reference to the mutex.
pub struct Mutex<T, R> {
    lock: R,
    value: UnsafeCell<T>,
}

// The lock hands out `&mut T` to one context at a time.
unsafe impl<T: Send, R: Sync> Sync for Mutex<T, R> {}

impl<T, R> Mutex<T, R> {
    pub const fn from_raw(lock: R, value: T) -> Self {
        Self {
            lock,
            value: UnsafeCell::new(value),
        }
    }

    /// The underlying lock, e.g. to inspect its state.
    #[inline]
    pub const fn raw(&self) -> &R {
        &self.lock
    }

    /// Direct access; `&mut self` already rules out other holders.
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T> Mutex<T, Spinlock<NativeLock>> {
    /// A mutex over a native-strategy [`Spinlock`].
    pub const fn new(value: T) -> Self {
        Self::from_raw(Spinlock::new(), value)
    }
}

impl<T, S> Mutex<T, Spinlock<S>> {
    /// A mutex over a [`Spinlock`] with an explicit strategy.
    pub const fn with_strategy(value: T) -> Self {
        Self::from_raw(Spinlock::new(), value)
    }
}

impl<T: Default, R: Default> Default for Mutex<T, R> {
    fn default() -> Self {
        Self::from_raw(R::default(), T::default())
    }
}

impl<T, R: RawLock + RawUnlock> Mutex<T, R> {
    /// Spins until the lock is held and returns the guard.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T, R> {
        self.lock.raw_lock();
        MutexGuard { mutex: self }
    }

    #[inline]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T, R>> {
        self.lock
            .raw_try_lock()
            .then(|| MutexGuard { mutex: self })
    }

    /// Bounded acquisition: up to `attempts` calls of [`try_lock`](Self::try_lock).
    ///
    /// # Errors
    /// [`SyncError::Busy`] if the lock stayed held throughout.
    pub fn try_lock_for(&self, attempts: usize) -> Result<MutexGuard<'_, T, R>, SyncError> {
        backoff::try_for(core::ptr::from_ref(&self.lock).cast(), attempts, || {
            self.lock.raw_try_lock()
        })?;
        Ok(MutexGuard { mutex: self })
    }

    /// Runs `f` with the lock held.
    #[inline]
    pub fn with_lock<U>(&self, f: impl FnOnce(&mut T) -> U) -> U {
        f(&mut self.lock())
    }
}

/// Exclusive access to a [`Mutex`] value; releases the lock on drop.
pub struct MutexGuard<'a, T, R: RawUnlock> {
    mutex: &'a Mutex<T, R>,
}

impl<T, R: RawUnlock> Deref for MutexGuard<'_, T, R> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard proves the lock is held.
        unsafe { &*self.mutex.value.get() }
    }
}

impl<T, R: RawUnlock> DerefMut for MutexGuard<'_, T, R> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard proves the lock is held.
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<T, R: RawUnlock> Drop for MutexGuard<'_, T, R> {
    fn drop(&mut self) {
        // SAFETY: this guard took the lock.
        unsafe { self.mutex.lock.raw_unlock() }
    }
}
