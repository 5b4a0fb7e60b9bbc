//! Device records exchanged with the host MIDI API.

use serde::{Deserialize, Serialize};

/// Host-assigned device identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw record as reported by device discovery, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    /// Some hosts report devices without a display name.
    pub name: Option<String>,
    /// Ports this device sends data out of, i.e. ports we can receive from.
    pub output_port_count: usize,
}

impl DeviceInfo {
    pub fn new(id: u64, name: impl Into<String>, output_port_count: usize) -> Self {
        Self {
            id: DeviceId(id),
            name: Some(name.into()),
            output_port_count,
        }
    }

    pub fn unnamed(id: u64, output_port_count: usize) -> Self {
        Self {
            id: DeviceId(id),
            name: None,
            output_port_count,
        }
    }
}

/// A device we can receive MIDI from. Immutable once captured by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: DeviceId,
    pub name: String,
    pub output_port_count: usize,
}

impl DeviceDescriptor {
    /// `None` for unnamed devices and devices with no output port.
    pub fn from_info(info: DeviceInfo) -> Option<Self> {
        let name = info.name?;
        (info.output_port_count > 0).then_some(Self {
            id: info.id,
            name,
            output_port_count: info.output_port_count,
        })
    }
}

/// Handle to an opened device, produced by a [`DeviceOpener`](crate::DeviceOpener).
///
/// `token` is opaque to the session; openers and bridges use it to find their
/// native resource again (file descriptor, port index, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    descriptor: DeviceDescriptor,
    token: u64,
}

impl DeviceHandle {
    pub fn new(descriptor: DeviceDescriptor, token: u64) -> Self {
        Self { descriptor, token }
    }

    #[inline]
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.descriptor.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[inline]
    pub fn token(&self) -> u64 {
        self.token
    }
}
