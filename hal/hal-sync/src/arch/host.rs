//! Hosted emulation of the core intrinsics.
//!
//! Lets every strategy run under `cargo test` with real threads standing in
//! for execution contexts:
//!
//! * The exclusive monitor is a per-thread reservation on one address. A
//!   store-exclusive succeeds only if the reservation is intact and the cell
//!   still holds the value seen by the load-exclusive.
//! * Interrupt masking is modelled as owning the single emulated core: a
//!   thread that masks interrupts excludes every other masking thread until
//!   it restores the state it saved.

use core::cell::Cell;
use core::hint::spin_loop;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering, fence};

use super::{Barrier, ExclusiveMonitor, InterruptMask, WaitForInterrupt};

/// The emulated core.
#[derive(Debug, Copy, Clone)]
pub struct Host;

/// Interrupt-enable state saved by [`Host::save_and_disable`](InterruptMask::save_and_disable).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HostIrqState {
    were_enabled: bool,
}

impl HostIrqState {
    #[must_use]
    pub const fn interrupts_enabled(self) -> bool {
        self.were_enabled
    }
}

#[derive(Copy, Clone)]
struct Reservation {
    address: usize,
    observed: usize,
}

/// Owned by whichever thread currently has interrupts masked.
static CORE: AtomicBool = AtomicBool::new(false);

thread_local! {
    static RESERVATION: Cell<Option<Reservation>> = const { Cell::new(None) };
    static LOST_RESERVATIONS: Cell<usize> = const { Cell::new(0) };
    static INTERRUPTS_ENABLED: Cell<bool> = const { Cell::new(true) };
}

impl Host {
    /// Makes the next `count` store-exclusive operations on this thread fail
    /// as if another agent had touched the reserved address.
    pub fn inject_reservation_loss(count: usize) {
        LOST_RESERVATIONS.set(count);
    }

    /// Whether this thread holds an exclusive reservation.
    #[must_use]
    pub fn has_reservation() -> bool {
        RESERVATION.get().is_some()
    }

    fn reserve(address: usize, observed: usize) {
        RESERVATION.set(Some(Reservation { address, observed }));
    }

    /// Consumes the reservation; returns the observed value if it covers
    /// `address` and no loss was injected.
    fn take_reservation(address: usize) -> Option<usize> {
        let reservation = RESERVATION.take()?;
        let lost = LOST_RESERVATIONS.get();
        if lost > 0 {
            LOST_RESERVATIONS.set(lost - 1);
            return None;
        }
        (reservation.address == address).then_some(reservation.observed)
    }
}

impl Barrier for Host {
    #[inline]
    fn memory_barrier() {
        fence(Ordering::SeqCst);
    }
}

impl WaitForInterrupt for Host {
    fn wait_for_interrupt() {
        std::thread::yield_now();
    }
}

unsafe impl ExclusiveMonitor for Host {
    unsafe fn load_exclusive_u8(cell: &AtomicU8) -> u8 {
        let value = cell.load(Ordering::Relaxed);
        Self::reserve(cell.as_ptr().addr(), usize::from(value));
        value
    }

    unsafe fn store_exclusive_u8(cell: &AtomicU8, value: u8) -> bool {
        let Some(observed) = Self::take_reservation(cell.as_ptr().addr()) else {
            return false;
        };
        #[allow(clippy::cast_possible_truncation)]
        let observed = observed as u8;
        cell.compare_exchange(observed, value, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn load_exclusive_word(cell: &AtomicUsize) -> usize {
        let value = cell.load(Ordering::Relaxed);
        Self::reserve(cell.as_ptr().addr(), value);
        value
    }

    unsafe fn store_exclusive_word(cell: &AtomicUsize, value: usize) -> bool {
        let Some(observed) = Self::take_reservation(cell.as_ptr().addr()) else {
            return false;
        };
        cell.compare_exchange(observed, value, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    fn clear_exclusive() {
        RESERVATION.set(None);
    }
}

impl InterruptMask for Host {
    type State = HostIrqState;

    fn save_and_disable() -> HostIrqState {
        let were_enabled = INTERRUPTS_ENABLED.get();
        if were_enabled {
            while CORE
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
            {
                spin_loop();
                std::thread::yield_now();
            }
            INTERRUPTS_ENABLED.set(false);
        }
        HostIrqState { were_enabled }
    }

    fn restore(state: HostIrqState) {
        if state.were_enabled && !INTERRUPTS_ENABLED.get() {
            INTERRUPTS_ENABLED.set(true);
            CORE.store(false, Ordering::Release);
        }
    }

    fn interrupts_enabled() -> bool {
        INTERRUPTS_ENABLED.get()
    }
}
