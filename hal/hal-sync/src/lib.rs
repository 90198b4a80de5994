//! # Cross-architecture lock and exchange primitives
//!
//! Two primitives, each with one interface and a strategy chosen at build
//! time by what the core can guarantee atomically:
//!
//! * [`Spinlock`]: a one-byte binary lock usable from interrupt context.
//! * [`AtomicSlot`]: a word-sized cell with compare-and-exchange, for
//!   installing a pointer exactly once or handing a single value over.
//!
//! | Strategy | Used on | Technique |
//! |---|---|---|
//! | [`Exclusive`] | ARMv7-M (Cortex-M3/M4/M7), host | load/store-exclusive, `clrex` on mismatch, barrier |
//! | [`Masked`] | ARMv6-M (Cortex-M0/M0+), RISC-V locks | interrupts masked around a plain test-and-set |
//! | [`Fenced`] | RISC-V exchange (single hart) | a fence and a plain compare/store |
//!
//! [`NativeLock`] and [`NativeExchange`] name the strategies of the build
//! target; they are the defaults of [`Spinlock`] and [`AtomicSlot`].
//!
//! ```
//! use hal_sync::{AtomicSlot, Spinlock};
//!
//! static LOCK: Spinlock = Spinlock::new();
//! static OWNER: AtomicSlot<usize> = AtomicSlot::empty();
//!
//! LOCK.lock();
//! // ... touch the shared peripheral ...
//! unsafe { LOCK.unlock() };
//!
//! assert!(OWNER.compare_exchange(0, 42).is_ok());
//! assert_eq!(OWNER.compare_exchange(0, 7), Err(42));
//! ```

#![cfg_attr(all(target_os = "none", not(any(test, doctest))), no_std)]
#![allow(unsafe_code)]

pub mod arch;
mod backoff;
mod error;
mod exclusive;
mod fenced;
mod instances;
pub mod irq;
mod masked;
mod mutex;
pub mod register;
mod slot;
mod spinlock;

use core::sync::atomic::{AtomicU8, AtomicUsize};

pub use backoff::CONTENTION_WARN_SPINS;
pub use error::SyncError;
pub use exclusive::Exclusive;
pub use fenced::Fenced;
pub use instances::InstanceTable;
pub use irq::{IrqGuard, IrqMutex};
pub use masked::Masked;
pub use mutex::{Mutex, MutexGuard};
pub use slot::{AtomicSlot, Empty, Word};
pub use spinlock::{LOCKED, LockState, Spinlock, UNLOCKED};

/// Lock strategy of the build target.
#[cfg(any(not(target_os = "none"), armv7m))]
pub type NativeLock = Exclusive<arch::Native>;

/// Lock strategy of the build target.
#[cfg(all(target_os = "none", not(armv7m)))]
pub type NativeLock = Masked<arch::Native>;

/// Compare-and-exchange strategy of the build target.
#[cfg(any(not(target_os = "none"), armv7m))]
pub type NativeExchange = Exclusive<arch::Native>;

/// Compare-and-exchange strategy of the build target.
#[cfg(all(
    target_os = "none",
    any(
        armv6m,
        all(
            any(target_arch = "riscv32", target_arch = "riscv64"),
            feature = "riscv-masked-exchange"
        )
    )
))]
pub type NativeExchange = Masked<arch::Native>;

/// Compare-and-exchange strategy of the build target.
///
/// Fence only: valid on a single hart with no bus master writing the slot.
#[cfg(all(
    target_os = "none",
    any(target_arch = "riscv32", target_arch = "riscv64"),
    not(feature = "riscv-masked-exchange")
))]
pub type NativeExchange = Fenced<arch::Native>;

/// A spinlock-protected value using the native lock strategy by default.
pub type SpinMutex<T, S = NativeLock> = Mutex<T, Spinlock<S>>;

/// Puts the core into its low-power wait until the next interrupt.
#[inline]
pub fn sleep() {
    arch::wait_for_interrupt::<arch::Native>();
}

/// Blocking mutual exclusion over a caller-owned lock object.
pub trait RawLock {
    fn raw_lock(&self);
    fn raw_try_lock(&self) -> bool;
}

pub trait RawUnlock {
    /// # Safety
    /// The caller must hold the lock.
    unsafe fn raw_unlock(&self);
}

/// How a [`Spinlock`] cell is acquired and released on a given core.
///
/// The cell holds [`UNLOCKED`] or [`LOCKED`] and nothing else.
pub trait LockStrategy {
    /// Spins until the cell was atomically moved from [`UNLOCKED`] to
    /// [`LOCKED`] by the caller. Memory accesses after the call are not
    /// observed before the acquisition.
    fn lock(cell: &AtomicU8);

    /// One acquisition attempt. Returns `false` and leaves the cell alone if
    /// it was [`LOCKED`].
    fn try_lock(cell: &AtomicU8) -> bool;

    /// Publishes every preceding memory access, then stores [`UNLOCKED`].
    ///
    /// # Safety
    /// The caller must hold the lock.
    unsafe fn unlock(cell: &AtomicU8);
}

/// How a word-sized slot is compared and exchanged on a given core.
pub trait ExchangeStrategy {
    /// Stores `new` if the slot holds `current`, indivisibly.
    ///
    /// Returns `Ok(previous)` on success and `Err(observed)` with the slot
    /// unmodified otherwise.
    ///
    /// # Errors
    /// `Err` carries the value found in the slot when it differs from `current`.
    fn compare_exchange(slot: &AtomicUsize, current: usize, new: usize) -> Result<usize, usize>;
}
