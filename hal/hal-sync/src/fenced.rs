//! Fence-only exchange for a single RISC-V hart.

use crate::ExchangeStrategy;
use crate::arch::{self, Barrier, WaitForInterrupt};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Degenerate strategy over core `C`: a memory fence followed by a plain
/// compare and store.
///
/// There is no retry and no contention path. This is only an atomic
/// compare-and-exchange when no other hart, interrupt handler or DMA master
/// writes the slot concurrently; nothing here enforces that. Builds that
/// cannot promise it should enable the `riscv-masked-exchange` feature.
pub struct Fenced<C>(PhantomData<fn() -> C>);

impl<C: Barrier> ExchangeStrategy for Fenced<C> {
    fn compare_exchange(slot: &AtomicUsize, current: usize, new: usize) -> Result<usize, usize> {
        C::memory_barrier();
        let observed = slot.load(Ordering::Relaxed);
        if observed != current {
            return Err(observed);
        }
        slot.store(new, Ordering::Relaxed);
        Ok(observed)
    }
}

impl<C: Barrier + WaitForInterrupt> Fenced<C> {
    /// Fence, then low-power wait for the next interrupt.
    #[inline]
    pub fn wait() {
        arch::wait_for_interrupt::<C>();
    }
}
