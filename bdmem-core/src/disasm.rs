use anyhow::Result;

use crate::device::Device;

/// One line of disassembly text, tied back to the address and raw encoding
/// it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    /// Address of the first byte of the instruction.
    pub address: u32,
    /// Raw 32-bit encoding. ARM-mode instructions are exactly one word.
    pub insn: u32,
    /// Rendered text, e.g. `ldr pc, [pc, #-4]`.
    pub text: String,
}

/// The instruction-decoding collaborator.
///
/// Methods return `anyhow::Result` so an external disassembler can plug in
/// without adopting the toolkit's error enum. Decoder limits and shape
/// mismatches are the collaborator's own errors and propagate untranslated.
pub trait Disasm {
    /// Disassemble `byte_len` bytes at `address`, reading them through
    /// `dev`. ARM mode when `thumb` is false.
    fn disassemble(
        &mut self,
        dev: &mut dyn Device,
        address: u32,
        byte_len: u32,
        thumb: bool,
    ) -> Result<String>;

    /// Split disassembly text into structured lines.
    fn lines(&self, text: &str) -> Vec<DisasmLine>;

    /// For a pc-relative-load line, the absolute address of the literal it
    /// loads from.
    fn ldrpc_source_address(&self, line: &DisasmLine) -> Result<u32>;
}
