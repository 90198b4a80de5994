use bitfield_struct::bitfield;

/// Cortex-M priority mask register.
///
/// While `pm` is set, all exceptions with configurable priority are masked.
/// `cpsid i` sets it, `cpsie i` clears it.
#[bitfield(u32, order = Lsb)]
pub struct Primask {
    /// Priority mask: interrupts disabled.
    pub pm: bool, // 0

    /// Reserved 1–31
    #[bits(31, default = 0)]
    _reserved: u32,
}

impl Primask {
    /// Whether this snapshot had interrupts enabled.
    #[inline]
    #[must_use]
    pub const fn interrupts_enabled(self) -> bool {
        !self.pm()
    }
}
