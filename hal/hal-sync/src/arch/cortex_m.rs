//! ARM Cortex-M intrinsics.
//!
//! ARMv6-M parts (Cortex-M0/M0+) have no exclusive-access instructions, so
//! [`ExclusiveMonitor`] is only implemented when building for an ARMv7-M
//! class target (Cortex-M3/M4/M7).

use core::arch::asm;
#[cfg(armv7m)]
use core::sync::atomic::{AtomicU8, AtomicUsize};
use core::sync::atomic::{Ordering, compiler_fence};

#[cfg(armv7m)]
use super::ExclusiveMonitor;
use super::{Barrier, InterruptMask, WaitForInterrupt};
use crate::register::Primask;

/// A Cortex-M core.
#[derive(Debug, Copy, Clone)]
pub struct CortexM;

/// Reads `PRIMASK`.
#[inline]
#[must_use]
pub fn primask() -> Primask {
    let r: u32;
    unsafe { asm!("mrs {}, PRIMASK", out(reg) r, options(nomem, nostack, preserves_flags)) };
    Primask::from_bits(r)
}

/// Masks interrupts (`cpsid i`).
///
/// Not marked `nomem` so the compiler does not move memory accesses across it.
#[inline]
fn cpsid() {
    unsafe { asm!("cpsid i", options(nostack, preserves_flags)) };
}

/// Unmasks interrupts (`cpsie i`).
#[inline]
fn cpsie() {
    unsafe { asm!("cpsie i", options(nostack, preserves_flags)) };
}

impl Barrier for CortexM {
    #[inline]
    fn memory_barrier() {
        unsafe { asm!("dmb", options(nostack, preserves_flags)) };
    }
}

impl WaitForInterrupt for CortexM {
    #[inline]
    fn wait_for_interrupt() {
        unsafe { asm!("wfi", options(nomem, nostack, preserves_flags)) };
    }
}

impl InterruptMask for CortexM {
    type State = Primask;

    #[inline]
    fn save_and_disable() -> Primask {
        let state = primask();
        cpsid();
        compiler_fence(Ordering::SeqCst);
        state
    }

    #[inline]
    fn restore(state: Primask) {
        compiler_fence(Ordering::SeqCst);
        if state.interrupts_enabled() {
            cpsie();
        }
    }

    #[inline]
    fn interrupts_enabled() -> bool {
        primask().interrupts_enabled()
    }
}

#[cfg(armv7m)]
unsafe impl ExclusiveMonitor for CortexM {
    #[inline]
    unsafe fn load_exclusive_u8(cell: &AtomicU8) -> u8 {
        let value: u32;
        unsafe {
            asm!(
                "ldrexb {v}, [{p}]",
                p = in(reg) cell.as_ptr(),
                v = out(reg) value,
                options(nostack, preserves_flags)
            );
        }
        #[allow(clippy::cast_possible_truncation)]
        let byte = value as u8;
        byte
    }

    #[inline]
    unsafe fn store_exclusive_u8(cell: &AtomicU8, value: u8) -> bool {
        let failed: u32;
        unsafe {
            asm!(
                "strexb {r}, {v}, [{p}]",
                r = out(reg) failed,
                v = in(reg) u32::from(value),
                p = in(reg) cell.as_ptr(),
                options(nostack, preserves_flags)
            );
        }
        failed == 0
    }

    #[inline]
    unsafe fn load_exclusive_word(cell: &AtomicUsize) -> usize {
        let value: usize;
        unsafe {
            asm!(
                "ldrex {v}, [{p}]",
                p = in(reg) cell.as_ptr(),
                v = out(reg) value,
                options(nostack, preserves_flags)
            );
        }
        value
    }

    #[inline]
    unsafe fn store_exclusive_word(cell: &AtomicUsize, value: usize) -> bool {
        let failed: u32;
        unsafe {
            asm!(
                "strex {r}, {v}, [{p}]",
                r = out(reg) failed,
                v = in(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack, preserves_flags)
            );
        }
        failed == 0
    }

    #[inline]
    fn clear_exclusive() {
        unsafe { asm!("clrex", options(nomem, nostack, preserves_flags)) };
    }
}
