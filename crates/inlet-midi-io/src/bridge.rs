//! Contract with the native reading loop that pulls bytes off the transport.

use crate::device::DeviceHandle;
use crate::error::Result;

/// Native reading loop, provided by the host application.
///
/// Installed on the session with `set_native_setup_handler`. Messages read by
/// the loop come back through a [`NativeSink`](crate::NativeSink) on the
/// loop's own thread.
pub trait NativeBridge: Send + Sync {
    /// One-time setup of the native tier (callback registration and the like).
    fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Start reading `port` of an opened device.
    fn start_reading(&self, device: &DeviceHandle, port: usize) -> Result<()>;

    /// Ask the loop to halt. Best effort: messages already in flight may
    /// still be delivered after this returns.
    fn stop_reading(&self) -> Result<()>;
}
