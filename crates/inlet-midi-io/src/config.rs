//! Input subsystem configuration.

use serde::{Deserialize, Serialize};

/// What `select_and_open` does while another device is open or opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenPolicy {
    /// Stop reading, release the current device, then open the new one.
    #[default]
    Replace,
    /// Refuse with [`Error::SessionBusy`](crate::Error::SessionBusy).
    Reject,
}

/// When the virtual-port status notifier calls the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotifyPolicy {
    /// On every host status callback, changed or not.
    #[default]
    Always,
    /// Only when the active flag flips.
    OnChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Port read on an opened hardware device.
    pub port_number: usize,
    pub open_policy: OpenPolicy,
    pub notify_policy: NotifyPolicy,
    /// Run hardware messages through the note-length check as well.
    pub validate_hardware: bool,
    /// Open the first catalogued device when the device list changes and
    /// nothing is open.
    pub auto_open_first: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            port_number: 0,
            open_policy: OpenPolicy::Replace,
            notify_policy: NotifyPolicy::Always,
            validate_hardware: false,
            auto_open_first: false,
        }
    }
}
