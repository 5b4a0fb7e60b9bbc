//! Shared test helpers: a scripted host for the input subsystem.

#![allow(dead_code)]

use inlet::prelude::*;
use parking_lot::Mutex;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Host device list, editable between scans.
#[derive(Default)]
pub struct FakeHost {
    devices: Mutex<Vec<DeviceInfo>>,
}

impl FakeHost {
    pub fn new(devices: Vec<DeviceInfo>) -> Arc<Self> {
        Arc::new(Self {
            devices: Mutex::new(devices),
        })
    }

    pub fn set_devices(&self, devices: Vec<DeviceInfo>) {
        *self.devices.lock() = devices;
    }
}

impl DeviceDiscovery for FakeHost {
    fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        self.devices.lock().clone()
    }
}

/// Opens synchronously, handing out increasing tokens.
#[derive(Default)]
pub struct InstantOpener {
    next_token: Mutex<u64>,
}

impl DeviceOpener for InstantOpener {
    fn open_device(&self, descriptor: &DeviceDescriptor, completion: OpenCompletion) {
        let token = {
            let mut next = self.next_token.lock();
            *next += 1;
            *next
        };
        completion.opened(DeviceHandle::new(descriptor.clone(), token));
    }
}

/// Native loop stand-in; remembers which device it reads.
#[derive(Default)]
pub struct LoopbackBridge {
    pub reading: Mutex<Option<(String, usize)>>,
    pub initialised: Mutex<bool>,
}

impl NativeBridge for LoopbackBridge {
    fn init(&self) -> inlet::midi::Result<()> {
        *self.initialised.lock() = true;
        Ok(())
    }

    fn start_reading(&self, device: &DeviceHandle, port: usize) -> inlet::midi::Result<()> {
        *self.reading.lock() = Some((device.name().to_string(), port));
        Ok(())
    }

    fn stop_reading(&self) -> inlet::midi::Result<()> {
        *self.reading.lock() = None;
        Ok(())
    }
}

pub fn default_devices() -> Vec<DeviceInfo> {
    vec![
        DeviceInfo::new(1, "Arturia KeyStep", 1),
        DeviceInfo::new(2, "Roland FP-30", 1),
    ]
}
