//! Load-exclusive / store-exclusive strategy for cores with an exclusive
//! monitor (ARMv7-M and later).

use crate::arch::ExclusiveMonitor;
use crate::backoff::Backoff;
use crate::{ExchangeStrategy, LOCKED, LockStrategy, UNLOCKED};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Exclusive-access strategy over core `C`.
///
/// Every exclusive load is closed by either an exclusive store or a
/// `clrex`, so a failed attempt never leaves a reservation behind to stall
/// another context's exclusive sequence.
pub struct Exclusive<C>(PhantomData<fn() -> C>);

impl<C: ExclusiveMonitor> LockStrategy for Exclusive<C> {
    fn lock(cell: &AtomicU8) {
        let mut backoff = Backoff::new(cell);
        loop {
            // SAFETY: both branches below close the reservation.
            if unsafe { C::load_exclusive_u8(cell) } == UNLOCKED {
                if unsafe { C::store_exclusive_u8(cell, LOCKED) } {
                    break;
                }
                // Interference between load and store; start over.
            } else {
                C::clear_exclusive();
                backoff.snooze();
            }
        }
        C::memory_barrier();
    }

    fn try_lock(cell: &AtomicU8) -> bool {
        loop {
            // SAFETY: both branches below close the reservation.
            if unsafe { C::load_exclusive_u8(cell) } != UNLOCKED {
                C::clear_exclusive();
                return false;
            }
            if unsafe { C::store_exclusive_u8(cell, LOCKED) } {
                C::memory_barrier();
                return true;
            }
        }
    }

    unsafe fn unlock(cell: &AtomicU8) {
        C::memory_barrier();
        cell.store(UNLOCKED, Ordering::Relaxed);
    }
}

impl<C: ExclusiveMonitor> ExchangeStrategy for Exclusive<C> {
    fn compare_exchange(slot: &AtomicUsize, current: usize, new: usize) -> Result<usize, usize> {
        loop {
            // SAFETY: both branches below close the reservation.
            let observed = unsafe { C::load_exclusive_word(slot) };
            if observed != current {
                C::clear_exclusive();
                return Err(observed);
            }
            if unsafe { C::store_exclusive_word(slot, new) } {
                C::memory_barrier();
                return Ok(observed);
            }
        }
    }
}
