//! bdmem-arm
//!
//! Minimal ARM-mode disassembler for the long-jump idiom.
//!
//! This is not a general ARM decoder. It knows exactly enough to service
//! interrupt-vector lookups: `LDR (literal)`, i.e. `ldr rt, [pc, #imm]`,
//! with a `.word` fallback line for every other encoding so output stays one
//! line per word. Thumb is refused.

use anyhow::{bail, ensure, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use bdmem_core::device::Device;
use bdmem_core::disasm::{Disasm, DisasmLine};

/// `LDR (literal)`: `cond 010P U0W1 1111 tttt imm12` with P=1, W=0.
const LDR_LIT_MASK: u32 = 0x0f7f_0000;
const LDR_LIT_BITS: u32 = 0x051f_0000;
/// U bit: add (1) or subtract (0) the immediate.
const BIT_UP: u32 = 1 << 23;
/// ARM-mode reads of `pc` see the fetch pipeline, two instructions ahead.
const PC_BIAS: u32 = 8;

/// Literal-pool oriented [`Disasm`] implementation.
///
/// Words are fetched through the device at word granularity and reassembled
/// little-endian, so spans need not start on a word boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct LitPoolDisasm;

impl LitPoolDisasm {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn is_ldr_literal(insn: u32) -> bool {
    // cond == 0b1111 is the unconditional space, not a load
    insn & LDR_LIT_MASK == LDR_LIT_BITS && insn >> 28 != 0xf
}

/// Absolute address an `ldr rt, [pc, #imm]` at `address` loads from.
#[inline]
fn ldr_literal_source(address: u32, insn: u32) -> u32 {
    let imm = insn & 0xfff;
    let base = address.wrapping_add(PC_BIAS);
    if insn & BIT_UP != 0 {
        base.wrapping_add(imm)
    } else {
        base.wrapping_sub(imm)
    }
}

fn reg_name(r: u32) -> String {
    match r {
        13 => "sp".to_string(),
        14 => "lr".to_string(),
        15 => "pc".to_string(),
        _ => format!("r{r}"),
    }
}

fn render(address: u32, insn: u32) -> String {
    if is_ldr_literal(insn) {
        let rt = reg_name((insn >> 12) & 0xf);
        let imm = insn & 0xfff;
        let signed = if insn & BIT_UP != 0 {
            imm as i64
        } else {
            -(imm as i64)
        };
        let src = ldr_literal_source(address, insn);
        format!("{address:8x}:\t{insn:08x}\tldr\t{rt}, [pc, #{signed}]\t; {src:#x}")
    } else {
        format!("{address:8x}:\t{insn:08x}\t.word\t{insn:#010x}")
    }
}

fn parse_line(line: &str) -> Option<DisasmLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (addr, rest) = trimmed.split_once(':')?;
    let address = u32::from_str_radix(addr.trim(), 16).ok()?;
    let insn = u32::from_str_radix(rest.split_whitespace().next()?, 16).ok()?;
    Some(DisasmLine {
        address,
        insn,
        text: trimmed.to_string(),
    })
}

impl Disasm for LitPoolDisasm {
    fn disassemble(
        &mut self,
        dev: &mut dyn Device,
        address: u32,
        byte_len: u32,
        thumb: bool,
    ) -> Result<String> {
        ensure!(!thumb, "thumb mode is not supported by the literal-pool decoder");
        ensure!(
            byte_len % 4 == 0,
            "ARM-mode span must be a whole number of instructions: {byte_len} bytes"
        );

        // The channel is word-granular: fetch whole words covering the span,
        // then trim to the requested bytes.
        let start = address & !3;
        let lead = (address - start) as usize;
        let span = lead + byte_len as usize;
        let words = (span + 3) / 4;
        let mut bytes = Vec::with_capacity(words * 4);
        for i in 0..words as u32 {
            let word = dev.peek(start.wrapping_add(i * 4))?;
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let bytes = &bytes[lead..lead + byte_len as usize];

        let mut out = String::new();
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            let insn = LittleEndian::read_u32(chunk);
            let at = address.wrapping_add(i as u32 * 4);
            trace!("decode [{at:#010x}] = {insn:#010x}");
            out.push_str(&render(at, insn));
            out.push('\n');
        }
        Ok(out)
    }

    fn lines(&self, text: &str) -> Vec<DisasmLine> {
        text.lines().filter_map(parse_line).collect()
    }

    fn ldrpc_source_address(&self, line: &DisasmLine) -> Result<u32> {
        if !is_ldr_literal(line.insn) {
            bail!("not a pc-relative load: {}", line.text);
        }
        Ok(ldr_literal_source(line.address, line.insn))
    }
}
