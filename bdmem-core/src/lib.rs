//! bdmem-core
//!
//! Runtime patching of a memory-mapped embedded ARM processor over a raw
//! debug channel: bit-level register updates, interrupt-vector redirection
//! through literal pools, RAM overlay window control, and reset provocation.
//!
//! The channel is a capability trait ([`Device`]) and instruction decoding is
//! a collaborator trait ([`Disasm`]); this crate owns the protocol logic
//! between them and holds no state of its own between calls.

pub mod device;
pub mod disasm;
pub mod error;
pub mod ivt;
pub mod overlay;
pub mod regs;
pub mod reset;

/// Mock collaborators, kept as a public module so sibling crates and
/// downstream users can reuse them.
pub mod testing;

pub use device::{Device, DeviceError};
pub use disasm::{Disasm, DisasmLine};
pub use error::{Error, Result};
pub use overlay::{OverlayCtl, OverlayLayout, OverlayState};
pub use regs::{poke_bic, poke_orr};
pub use reset::reset_arm;
