//! Interrupt-masking strategy for single cores without exclusive-access
//! instructions (ARMv6-M, single-hart RISC-V).

use crate::arch::{Barrier, InterruptMask};
use crate::backoff::Backoff;
use crate::irq::IrqGuard;
use crate::{ExchangeStrategy, LOCKED, LockStrategy, UNLOCKED};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Interrupt-masking strategy over core `C`.
///
/// A test-and-set made of plain accesses is atomic as long as nothing can
/// preempt it, which masking interrupts guarantees on a single core. The
/// caller's interrupt-enable state is saved and restored as found, so a
/// caller that already runs with interrupts masked keeps them masked.
pub struct Masked<C>(PhantomData<fn() -> C>);

impl<C: InterruptMask + Barrier> LockStrategy for Masked<C> {
    fn lock(cell: &AtomicU8) {
        let mut backoff = Backoff::new(cell);
        // Interrupts are restored between attempts so the holder can run.
        while !Self::try_lock(cell) {
            backoff.snooze();
        }
    }

    fn try_lock(cell: &AtomicU8) -> bool {
        let _irq = IrqGuard::<C>::new();
        if cell.load(Ordering::Relaxed) != UNLOCKED {
            return false;
        }
        cell.store(LOCKED, Ordering::Relaxed);
        C::memory_barrier();
        true
    }

    unsafe fn unlock(cell: &AtomicU8) {
        C::memory_barrier();
        // A byte store cannot tear, and the holder is the only writer.
        cell.store(UNLOCKED, Ordering::Relaxed);
    }
}

impl<C: InterruptMask + Barrier> ExchangeStrategy for Masked<C> {
    fn compare_exchange(slot: &AtomicUsize, current: usize, new: usize) -> Result<usize, usize> {
        let _irq = IrqGuard::<C>::new();
        let observed = slot.load(Ordering::Relaxed);
        if observed != current {
            return Err(observed);
        }
        slot.store(new, Ordering::Relaxed);
        C::memory_barrier();
        Ok(observed)
    }
}
