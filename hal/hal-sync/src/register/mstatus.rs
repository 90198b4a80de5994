use bitfield_struct::bitfield;

/// RISC-V machine status register, low 32 bits.
///
/// Only `mie` matters for interrupt masking; the remaining fields are
/// modelled so a saved value can be inspected in full.
#[bitfield(u32, order = Lsb)]
pub struct Mstatus {
    #[bits(default = false)]
    _wpri0: bool, // 0

    /// Supervisor interrupt enable
    pub sie: bool, // 1

    #[bits(default = false)]
    _wpri2: bool, // 2

    /// Machine interrupt enable
    pub mie: bool, // 3

    #[bits(default = false)]
    _wpri4: bool, // 4

    /// Supervisor previous interrupt enable
    pub spie: bool, // 5

    /// User-mode big endian
    pub ube: bool, // 6

    /// Machine previous interrupt enable
    pub mpie: bool, // 7

    /// Supervisor previous privilege
    pub spp: bool, // 8

    /// Vector extension state
    #[bits(2)]
    pub vs: u8, // 9–10

    /// Machine previous privilege
    #[bits(2)]
    pub mpp: u8, // 11–12

    /// Floating point state
    #[bits(2)]
    pub fs: u8, // 13–14

    /// Additional extension state
    #[bits(2)]
    pub xs: u8, // 15–16

    /// Modify privilege
    pub mprv: bool, // 17

    /// Permit supervisor user memory access
    pub sum: bool, // 18

    /// Make executable readable
    pub mxr: bool, // 19

    /// Trap virtual memory
    pub tvm: bool, // 20

    /// Timeout wait
    pub tw: bool, // 21

    /// Trap SRET
    pub tsr: bool, // 22

    /// Reserved 23–31 (SD on RV32)
    #[bits(9, default = 0)]
    _rest: u16,
}

impl Mstatus {
    /// Bit mask of `mie`, for `csrrci`/`csrsi`.
    pub const MIE_MASK: usize = 1 << 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mie_matches_mask() {
        let m = Mstatus::new().with_mie(true);
        assert_eq!(m.into_bits() as usize, Mstatus::MIE_MASK);
    }

    #[test]
    fn machine_mode_snapshot_decodes() {
        // MPP = 0b11 (machine), MPIE and MIE set.
        let m = Mstatus::from_bits(0x0000_1888);
        assert!(m.mie());
        assert!(m.mpie());
        assert_eq!(m.mpp(), 0b11);
        assert!(!m.sie());
    }
}
