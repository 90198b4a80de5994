//! RISC-V machine-mode intrinsics for single-hart parts.
//!
//! No exclusive monitor is exposed here: the exchange primitive on these
//! parts is the fence-only [`Fenced`](crate::Fenced) variant, which relies on
//! a single hart and no competing bus master.

use core::arch::asm;
use core::sync::atomic::{Ordering, compiler_fence};

use super::{Barrier, InterruptMask, WaitForInterrupt};
use crate::register::Mstatus;

/// A single RISC-V hart running in machine mode.
#[derive(Debug, Copy, Clone)]
pub struct Riscv;

/// Reads `mstatus`.
#[inline]
#[must_use]
pub fn mstatus() -> Mstatus {
    let r: usize;
    unsafe { asm!("csrr {}, mstatus", out(reg) r, options(nomem, nostack, preserves_flags)) };
    #[allow(clippy::cast_possible_truncation)]
    let low = r as u32;
    Mstatus::from_bits(low)
}

impl Barrier for Riscv {
    #[inline]
    fn memory_barrier() {
        unsafe { asm!("fence rw, rw", options(nostack, preserves_flags)) };
    }
}

impl WaitForInterrupt for Riscv {
    #[inline]
    fn wait_for_interrupt() {
        unsafe { asm!("wfi", options(nomem, nostack, preserves_flags)) };
    }
}

impl InterruptMask for Riscv {
    type State = Mstatus;

    #[inline]
    fn save_and_disable() -> Mstatus {
        let r: usize;
        unsafe {
            asm!(
                "csrrci {}, mstatus, {mie}",
                out(reg) r,
                mie = const Mstatus::MIE_MASK,
                options(nostack, preserves_flags)
            );
        }
        compiler_fence(Ordering::SeqCst);
        #[allow(clippy::cast_possible_truncation)]
        let low = r as u32;
        Mstatus::from_bits(low)
    }

    #[inline]
    fn restore(state: Mstatus) {
        compiler_fence(Ordering::SeqCst);
        if state.mie() {
            unsafe {
                asm!(
                    "csrsi mstatus, {mie}",
                    mie = const Mstatus::MIE_MASK,
                    options(nostack, preserves_flags)
                );
            }
        }
    }

    #[inline]
    fn interrupts_enabled() -> bool {
        mstatus().mie()
    }
}
