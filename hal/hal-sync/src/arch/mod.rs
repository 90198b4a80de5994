//! # Core intrinsics
//!
//! The narrow boundary between the lock/exchange algorithms and the
//! instructions a particular core offers. Each strategy in this crate is
//! written once against these traits; the architecture modules implement
//! them with a handful of inline instructions.
//!
//! | Core | Barrier | Exclusive access | Interrupt mask | Wait |
//! |---|---|---|---|---|
//! | `CortexM` (ARMv7-M) | `dmb` | `ldrex`/`strex`/`clrex` | `PRIMASK` | `wfi` |
//! | `CortexM` (ARMv6-M) | `dmb` | none | `PRIMASK` | `wfi` |
//! | `Riscv` | `fence rw, rw` | none | `mstatus.MIE` | `wfi` |
//! | `Host` | `fence(SeqCst)` | emulated | emulated | `yield_now` |
//!
//! [`Native`] names the core of the build target.

use core::sync::atomic::{AtomicU8, AtomicUsize};

#[cfg(all(target_os = "none", target_arch = "arm"))]
mod cortex_m;
#[cfg(not(target_os = "none"))]
pub mod host;
#[cfg(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64")))]
mod riscv;

#[cfg(all(target_os = "none", target_arch = "arm"))]
pub use cortex_m::CortexM;
#[cfg(not(target_os = "none"))]
pub use host::Host;
#[cfg(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64")))]
pub use riscv::Riscv;

/// The core this binary is built for.
#[cfg(all(target_os = "none", target_arch = "arm"))]
pub type Native = CortexM;

/// The core this binary is built for.
#[cfg(all(target_os = "none", any(target_arch = "riscv32", target_arch = "riscv64")))]
pub type Native = Riscv;

/// The core this binary is built for.
#[cfg(not(target_os = "none"))]
pub type Native = Host;

#[cfg(all(target_os = "none", target_arch = "arm", not(any(armv6m, armv7m))))]
compile_error!("unsupported ARM core: expected an ARMv6-M or ARMv7-M class target");

#[cfg(all(
    target_os = "none",
    not(any(target_arch = "arm", target_arch = "riscv32", target_arch = "riscv64"))
))]
compile_error!("unsupported bare-metal architecture");

/// Full data memory barrier.
pub trait Barrier {
    /// Orders every memory access before the call against every access
    /// after it, as seen by other cores, interrupt handlers and bus masters.
    ///
    /// Also acts as a compiler barrier.
    fn memory_barrier();
}

/// Load-exclusive / store-exclusive instruction pairs.
///
/// # Safety
///
/// Implementations must provide real exclusive-access semantics: an
/// exclusive store succeeds only if no other agent wrote the location since
/// the matching exclusive load.
pub unsafe trait ExclusiveMonitor: Barrier {
    /// Reads a byte and opens a reservation on its address.
    ///
    /// # Safety
    /// Must be followed by exactly one [`store_exclusive_u8`](Self::store_exclusive_u8)
    /// or [`clear_exclusive`](Self::clear_exclusive) before the next exclusive load.
    unsafe fn load_exclusive_u8(cell: &AtomicU8) -> u8;

    /// Writes a byte if the reservation is still intact. Returns `true` if
    /// the store happened. The reservation is gone either way.
    ///
    /// # Safety
    /// Must be paired with a preceding exclusive load of the same cell.
    unsafe fn store_exclusive_u8(cell: &AtomicU8, value: u8) -> bool;

    /// Word-sized [`load_exclusive_u8`](Self::load_exclusive_u8).
    ///
    /// # Safety
    /// See [`load_exclusive_u8`](Self::load_exclusive_u8).
    unsafe fn load_exclusive_word(cell: &AtomicUsize) -> usize;

    /// Word-sized [`store_exclusive_u8`](Self::store_exclusive_u8).
    ///
    /// # Safety
    /// See [`store_exclusive_u8`](Self::store_exclusive_u8).
    unsafe fn store_exclusive_word(cell: &AtomicUsize, value: usize) -> bool;

    /// Drops any outstanding reservation.
    fn clear_exclusive();
}

/// Global interrupt masking on the current core.
pub trait InterruptMask {
    /// Snapshot of the interrupt-enable state taken before masking.
    type State: Copy;

    /// Saves the current interrupt-enable state and masks interrupts.
    fn save_and_disable() -> Self::State;

    /// Restores the state returned by [`save_and_disable`](Self::save_and_disable).
    ///
    /// Interrupts are re-enabled only if they were enabled when the state
    /// was saved.
    fn restore(state: Self::State);

    /// Whether interrupts are currently enabled.
    fn interrupts_enabled() -> bool;
}

/// Low-power wait until the next interrupt.
pub trait WaitForInterrupt {
    fn wait_for_interrupt();
}

/// Completes outstanding memory accesses, then waits for an interrupt.
#[inline]
pub fn wait_for_interrupt<C: Barrier + WaitForInterrupt>() {
    C::memory_barrier();
    C::wait_for_interrupt();
}
