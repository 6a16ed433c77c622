//! Reset provocation over the debug channel.

use log::debug;

use crate::device::{Device, DeviceError};
use crate::error::Result;

/// Provoke a full processor reset by calling the reset vector.
///
/// The call never completes on the target side: the chip reboots with the
/// command still in flight, so the transport reports an I/O failure for
/// exactly this command. That failure class is the success signal here and
/// is answered with a transport reconnect. Any other outcome means the reset
/// did not behave as expected and propagates unchanged.
pub fn reset_arm(dev: &mut dyn Device) -> Result<()> {
    debug!("reset: calling the reset vector");
    match dev.blx(0) {
        Ok(()) => Ok(()),
        Err(DeviceError::Io { .. }) => {
            debug!("reset: transport dropped as expected, reconnecting");
            Ok(dev.reset()?)
        }
        Err(other) => Err(other.into()),
    }
}
