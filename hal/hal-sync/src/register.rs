//! Typed core registers holding the interrupt-enable state.

mod mstatus;
mod primask;

pub use mstatus::Mstatus;
pub use primask::Primask;
