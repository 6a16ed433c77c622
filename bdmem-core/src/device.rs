use thiserror::Error;

/// Failure classes every transport reports in.
///
/// The split matters to [`reset_arm`](crate::reset::reset_arm): a transport
/// that dies mid-command (`Io`) is the expected outcome of a successful
/// reset, while a device that answers and refuses (`Protocol`) is not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The physical link failed mid-command (USB stall, SCSI timeout,
    /// dropped socket).
    #[error("transport i/o failure: {reason}")]
    Io { reason: String },

    /// The device answered, but rejected or garbled the command.
    #[error("protocol error: {reason}")]
    Protocol { reason: String },
}

/// Raw debug-channel capabilities of one target device.
///
/// Any transport (serial, USB mass-storage command channel, network) exposes
/// the same four operations. The toolkit borrows a handle exclusively for the
/// duration of one call; serializing access across callers is the owner's
/// responsibility.
pub trait Device {
    /// Read one 32-bit word from the target's physical address space.
    fn peek(&mut self, address: u32) -> Result<u32, DeviceError>;

    /// Write one 32-bit word into the target's physical address space.
    fn poke(&mut self, address: u32, value: u32) -> Result<(), DeviceError>;

    /// Call code at `address` on the target and return (branch-with-link).
    ///
    /// Fails with [`DeviceError::Io`] when the call does not complete
    /// normally, which is exactly what happens when the callee reboots the
    /// chip with the command in flight.
    fn blx(&mut self, address: u32) -> Result<(), DeviceError>;

    /// Re-establish the transport session after a disconnect.
    fn reset(&mut self) -> Result<(), DeviceError>;
}
