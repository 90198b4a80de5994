use crate::arch::InterruptMask;
use crate::{Mutex, MutexGuard, RawLock, RawUnlock};
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

/// A mutex guard that also masks interrupts while held.
///
/// When created via [`Mutex::lock_irq`], it:
///
/// 1. saves the current interrupt state and masks interrupts, and
/// 2. acquires the underlying mutex,
///
/// releasing them in reverse order on drop: the lock is released first,
/// then interrupts are restored.
///
/// This keeps interrupt handlers on the same core from preempting the
/// critical section and spinning on a lock their own core holds.
///
/// # Examples
///
/// ```
/// use hal_sync::SpinMutex;
/// use hal_sync::arch::Native;
///
/// static M: SpinMutex<u32> = SpinMutex::new(0);
///
/// {
///     let mut g = M.lock_irq::<Native>();
///     *g += 1;
/// }
/// // lock released, interrupts restored
/// ```
pub struct IrqMutex<'a, T, R: RawLock + RawUnlock, M: InterruptMask> {
    // Field order is drop order: unlock before restoring interrupts.
    guard: MutexGuard<'a, T, R>,
    _irq: IrqGuard<M>,
}

impl<T, R: RawLock + RawUnlock> Mutex<T, R> {
    /// Acquires the mutex with interrupts masked for the guard's lifetime.
    #[inline]
    pub fn lock_irq<M: InterruptMask>(&self) -> IrqMutex<'_, T, R, M> {
        let irq = IrqGuard::new();
        let guard = self.lock();
        IrqMutex { guard, _irq: irq }
    }
}

impl<T, R: RawLock + RawUnlock, M: InterruptMask> Deref for IrqMutex<'_, T, R, M> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, R: RawLock + RawUnlock, M: InterruptMask> DerefMut for IrqMutex<'_, T, R, M> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// RAII guard that masks interrupts on creation and restores them on drop.
///
/// The interrupt state is snapshotted first; on drop, interrupts are
/// re-enabled **only** if they were enabled before, preserving a caller's
/// masked state across nested guards.
///
/// ```
/// use hal_sync::IrqGuard;
/// use hal_sync::arch::{InterruptMask, Native};
///
/// let before = Native::interrupts_enabled();
/// {
///     let _g = IrqGuard::<Native>::new();
///     assert!(!Native::interrupts_enabled());
/// }
/// assert_eq!(Native::interrupts_enabled(), before);
/// ```
pub struct IrqGuard<M: InterruptMask> {
    saved: M::State,
    // Interrupt state belongs to the current core.
    _not_send: PhantomData<*const ()>,
}

impl<M: InterruptMask> Default for IrqGuard<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: InterruptMask> IrqGuard<M> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            saved: M::save_and_disable(),
            _not_send: PhantomData,
        }
    }

    /// The state that will be restored on drop.
    #[inline]
    pub const fn saved(&self) -> M::State {
        self.saved
    }
}

impl<M: InterruptMask> Drop for IrqGuard<M> {
    fn drop(&mut self) {
        M::restore(self.saved);
    }
}
