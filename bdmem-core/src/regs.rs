//! Read-modify-write register update primitives.
//!
//! The debug channel exposes no atomic read-modify-write, so each helper is
//! two transactions (one peek, one poke). A concurrent writer on the target
//! can race in between; that window is inherent to the protocol and owned by
//! the caller.

use log::trace;

use crate::device::Device;
use crate::error::Result;

/// Set bits: `*address |= mask`. Named after the ARM instruction.
pub fn poke_orr(dev: &mut dyn Device, address: u32, mask: u32) -> Result<()> {
    let old = dev.peek(address)?;
    trace!("orr [{address:#010x}] {old:#010x} |= {mask:#010x}");
    dev.poke(address, old | mask)?;
    Ok(())
}

/// Clear bits: `*address &= !mask`. Named after the ARM instruction.
pub fn poke_bic(dev: &mut dyn Device, address: u32, mask: u32) -> Result<()> {
    let old = dev.peek(address)?;
    trace!("bic [{address:#010x}] {old:#010x} &= !{mask:#010x}");
    dev.poke(address, old & !mask)?;
    Ok(())
}
