//! Mock collaborators for unit tests and prototyping.
//!
//! This is intentionally a module (not `#[cfg(test)]`) so it can be reused
//! from sibling crates and downstream code that wants to drive the toolkit
//! against fake hardware.

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use crate::device::{Device, DeviceError};
use crate::disasm::{Disasm, DisasmLine};

/// One recorded channel transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Txn {
    Peek(u32),
    Poke(u32, u32),
    Blx(u32),
    Reset,
}

/// Sparse word-addressed fake target with a transaction journal.
///
/// Unwritten memory reads as 0. The journal records every transaction in
/// order, for sequence assertions.
#[derive(Debug, Default)]
pub struct MockDevice {
    mem: BTreeMap<u32, u32>,
    pub journal: Vec<Txn>,
    /// When set, the next `blx` fails with this error instead of running.
    pub blx_failure: Option<DeviceError>,
    /// Number of `reset` calls served.
    pub resets: usize,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load one word of target memory.
    pub fn load(&mut self, address: u32, value: u32) -> &mut Self {
        self.mem.insert(address, value);
        self
    }

    /// Word at `address` as the target would read it.
    pub fn word(&self, address: u32) -> u32 {
        self.mem.get(&address).copied().unwrap_or(0)
    }

    /// The writes from the journal, in order.
    pub fn pokes(&self) -> Vec<(u32, u32)> {
        self.journal
            .iter()
            .filter_map(|t| match *t {
                Txn::Poke(address, value) => Some((address, value)),
                _ => None,
            })
            .collect()
    }
}

impl Device for MockDevice {
    fn peek(&mut self, address: u32) -> Result<u32, DeviceError> {
        self.journal.push(Txn::Peek(address));
        Ok(self.word(address))
    }

    fn poke(&mut self, address: u32, value: u32) -> Result<(), DeviceError> {
        self.journal.push(Txn::Poke(address, value));
        self.mem.insert(address, value);
        Ok(())
    }

    fn blx(&mut self, address: u32) -> Result<(), DeviceError> {
        self.journal.push(Txn::Blx(address));
        match self.blx_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn reset(&mut self) -> Result<(), DeviceError> {
        self.journal.push(Txn::Reset);
        self.resets += 1;
        Ok(())
    }
}

/// Disassembler stub that resolves vector slots to literal addresses by
/// lookup table, for tests that don't care about real encodings.
///
/// `disassemble` emits one line per mapped instruction address in the span
/// and nothing for unmapped ones.
#[derive(Debug, Default)]
pub struct TableDisasm {
    targets: BTreeMap<u32, u32>,
}

impl TableDisasm {
    /// Declare that the instruction at `address` loads from `literal`.
    pub fn map(&mut self, address: u32, literal: u32) -> &mut Self {
        self.targets.insert(address, literal);
        self
    }
}

impl Disasm for TableDisasm {
    fn disassemble(
        &mut self,
        _dev: &mut dyn Device,
        address: u32,
        byte_len: u32,
        thumb: bool,
    ) -> Result<String> {
        if thumb {
            bail!("table disassembler has no thumb entries");
        }
        let mut out = String::new();
        let mut at = address;
        let end = address.wrapping_add(byte_len);
        while at < end {
            if self.targets.contains_key(&at) {
                out.push_str(&format!("{at:8x}:\t00000000\tldr\tpc, [pc, #0]\n"));
            }
            at = at.wrapping_add(4);
        }
        Ok(out)
    }

    fn lines(&self, text: &str) -> Vec<DisasmLine> {
        text.lines()
            .filter_map(|line| {
                let (addr, _) = line.split_once(':')?;
                Some(DisasmLine {
                    address: u32::from_str_radix(addr.trim(), 16).ok()?,
                    insn: 0,
                    text: line.trim().to_string(),
                })
            })
            .collect()
    }

    fn ldrpc_source_address(&self, line: &DisasmLine) -> Result<u32> {
        match self.targets.get(&line.address) {
            Some(&literal) => Ok(literal),
            None => bail!("no literal mapped at {:#010x}", line.address),
        }
    }
}
