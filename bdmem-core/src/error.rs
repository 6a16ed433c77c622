use thiserror::Error;

use crate::device::DeviceError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the toolkit can fail with.
///
/// Only one rule is enforced locally (overlay base alignment); all other
/// numeric and range issues surface as whatever the hardware or the
/// disassembler produces.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The overlay base must be a multiple of 4. No silent truncation.
    #[error("overlay mapping address must be word aligned: {address:#010x}")]
    UnalignedOverlay { address: u32 },

    /// The disassembler produced no lines for a vector slot.
    #[error("no disassembly produced at {address:#010x}")]
    EmptyDisassembly { address: u32 },

    /// A disassembler-specific failure (for instance a vector slot that does
    /// not hold a pc-relative load), passed through untranslated.
    #[error(transparent)]
    Disasm(#[from] anyhow::Error),
}
