//! Catalog of hardware devices we can receive MIDI from.

use crate::device::{DeviceDescriptor, DeviceInfo};
use parking_lot::RwLock;
use tracing::debug;

/// Host device-discovery API.
pub trait DeviceDiscovery: Send + Sync {
    /// All devices currently known to the host, unfiltered.
    fn enumerate_devices(&self) -> Vec<DeviceInfo>;
}

impl<F> DeviceDiscovery for F
where
    F: Fn() -> Vec<DeviceInfo> + Send + Sync,
{
    fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        self()
    }
}

/// Ordered list of receivable devices, rebuilt from scratch on every scan.
#[derive(Debug, Default)]
pub struct DeviceCatalog {
    devices: RwLock<Vec<DeviceDescriptor>>,
}

impl DeviceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query discovery and replace the catalog contents.
    ///
    /// Unnamed devices and devices without an output port are skipped. An
    /// empty result is a valid outcome, not an error.
    pub fn scan(&self, discovery: &dyn DeviceDiscovery) -> Vec<DeviceDescriptor> {
        let found = discovery.enumerate_devices();
        let total = found.len();
        let devices: Vec<DeviceDescriptor> = found
            .into_iter()
            .filter_map(DeviceDescriptor::from_info)
            .collect();

        debug!(
            "MIDI device scan: {} receivable of {} reported",
            devices.len(),
            total
        );

        *self.devices.write() = devices.clone();
        devices
    }

    pub fn devices(&self) -> Vec<DeviceDescriptor> {
        self.devices.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<DeviceDescriptor> {
        self.devices.read().get(index).cloned()
    }

    pub fn first(&self) -> Option<DeviceDescriptor> {
        self.get(0)
    }

    /// Case-insensitive partial match on the device name.
    pub fn find_by_name(&self, name: &str) -> Option<DeviceDescriptor> {
        let needle = name.to_lowercase();
        self.devices
            .read()
            .iter()
            .find(|d| d.name.to_lowercase().contains(&needle))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}
