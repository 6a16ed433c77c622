//! Interrupt-vector redirection.
//!
//! Vector slots on this hardware hold a `ldr pc, [pc, #imm]` long jump; the
//! real handler pointer lives in a nearby literal pool. Redirecting an
//! interrupt rewrites the literal, never the instruction itself. That avoids
//! re-encoding branch displacements and keeps the opcode intact when only
//! the literal pool is relocated to RAM.

use log::debug;

use crate::device::Device;
use crate::disasm::Disasm;
use crate::error::{Error, Result};

/// Locate the literal-pool slot the long jump at `address` loads from.
///
/// The instruction at `address` must be an ARM-mode pc-relative load; any
/// other shape is the disassembler's failure, passed through.
pub fn find_target(dev: &mut dyn Device, dis: &mut dyn Disasm, address: u32) -> Result<u32> {
    let text = dis.disassemble(dev, address, 4, false)?;
    let lines = dis.lines(&text);
    let first = lines.first().ok_or(Error::EmptyDisassembly { address })?;
    Ok(dis.ldrpc_source_address(first)?)
}

/// Current handler address of the long jump at `address`.
pub fn get(dev: &mut dyn Device, dis: &mut dyn Disasm, address: u32) -> Result<u32> {
    let target = find_target(dev, dis, address)?;
    Ok(dev.peek(target)?)
}

/// Point the long jump at `address` to `handler`.
///
/// The literal pool must be in writable RAM. Nothing checks that here; a
/// write into ROM fails silently or corrupts state in whatever way the
/// hardware decides.
pub fn set(dev: &mut dyn Device, dis: &mut dyn Disasm, address: u32, handler: u32) -> Result<()> {
    let target = find_target(dev, dis, address)?;
    debug!("ivt [{address:#010x}]: literal [{target:#010x}] = {handler:#010x}");
    dev.poke(target, handler)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{MockDevice, TableDisasm};

    fn fixture() -> (MockDevice, TableDisasm) {
        let mut d = MockDevice::new();
        d.load(0x104, 0x2000);
        let mut dis = TableDisasm::default();
        dis.map(0x100, 0x104);
        (d, dis)
    }

    #[test]
    fn find_target_resolves_the_literal_slot() {
        let (mut d, mut dis) = fixture();
        assert_eq!(find_target(&mut d, &mut dis, 0x100).unwrap(), 0x104);
    }

    #[test]
    fn get_reads_through_the_literal_slot() {
        let (mut d, mut dis) = fixture();
        assert_eq!(get(&mut d, &mut dis, 0x100).unwrap(), 0x2000);
    }

    #[test]
    fn set_rewrites_the_literal_slot_in_place() {
        let (mut d, mut dis) = fixture();
        set(&mut d, &mut dis, 0x100, 0x3000).unwrap();
        assert_eq!(d.word(0x104), 0x3000);
        assert_eq!(get(&mut d, &mut dis, 0x100).unwrap(), 0x3000);
        // the vector slot itself is untouched
        assert_eq!(d.word(0x100), 0);
    }

    #[test]
    fn unknown_slot_is_an_empty_disassembly() {
        let (mut d, mut dis) = fixture();
        let err = find_target(&mut d, &mut dis, 0x200).unwrap_err();
        assert!(matches!(err, Error::EmptyDisassembly { address: 0x200 }));
    }
}
