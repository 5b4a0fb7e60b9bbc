//! One MIDI input context per process: catalog, hardware session and the
//! app's virtual port, built together and shared by reference.
//!
//! ## Quick Start
//!
//! ```ignore
//! use inlet_midi_io::{MidiInputContext, message_queue};
//!
//! let input = MidiInputContext::builder()
//!     .discovery(host_discovery)
//!     .opener(host_opener)
//!     .bridge(native_loop)
//!     .build()?;
//!
//! let (receiver, mut consumer) = message_queue();
//! input.set_receiver(Arc::new(receiver));
//!
//! input.scan_devices();
//! let pending = input.open_device_by_name("Keystation")?;
//! pending.wait()?;
//!
//! // Synthesis thread
//! while let Some(message) = consumer.pop() { /* ... */ }
//! ```

mod builder;

pub use builder::MidiInputContextBuilder;

use crate::catalog::{DeviceCatalog, DeviceDiscovery};
use crate::config::InputConfig;
use crate::device::DeviceDescriptor;
use crate::error::{Error, Result};
use crate::opener::PendingOpen;
use crate::session::HardwareSessionManager;
use crate::virtual_port::VirtualPort;
use inlet_midi::MessageReceiver;
use std::sync::Arc;
use tracing::warn;

// ============================================================================
// MidiInputContext - Main Entry Point
// ============================================================================

/// MIDI input entry point. Clone is cheap (Arc internally).
///
/// The hardware session is shut down when the last clone is dropped.
#[derive(Clone)]
pub struct MidiInputContext {
    inner: Arc<MidiInputContextInner>,
}

pub(crate) struct MidiInputContextInner {
    pub(crate) config: InputConfig,
    pub(crate) discovery: Arc<dyn DeviceDiscovery>,
    pub(crate) hardware: HardwareSessionManager,
    pub(crate) virtual_port: VirtualPort,
}

impl Drop for MidiInputContextInner {
    fn drop(&mut self) {
        if let Err(e) = self.hardware.shutdown() {
            warn!("MIDI input shutdown failed: {}", e);
        }
    }
}

impl MidiInputContext {
    pub fn builder() -> MidiInputContextBuilder {
        MidiInputContextBuilder::default()
    }

    pub fn config(&self) -> &InputConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &Arc<DeviceCatalog> {
        self.inner.hardware.catalog()
    }

    pub fn hardware(&self) -> &HardwareSessionManager {
        &self.inner.hardware
    }

    pub fn virtual_port(&self) -> &VirtualPort {
        &self.inner.virtual_port
    }

    // ==================== Devices ====================

    /// Rescan host devices into the catalog.
    pub fn scan_devices(&self) -> Vec<DeviceDescriptor> {
        self.inner.hardware.scan(&*self.inner.discovery)
    }

    /// Host callback for attach/detach notifications.
    pub fn on_device_list_changed(&self) -> Result<Option<PendingOpen>> {
        self.inner
            .hardware
            .on_device_list_changed(&*self.inner.discovery)
    }

    /// Open the first catalogued device whose name contains `name`
    /// (case-insensitive).
    pub fn open_device_by_name(&self, name: &str) -> Result<PendingOpen> {
        let descriptor = self
            .catalog()
            .find_by_name(name)
            .ok_or_else(|| Error::MidiDevice(format!("no MIDI device matching '{}'", name)))?;
        self.inner.hardware.select_and_open(&descriptor)
    }

    // ==================== Receivers ====================

    /// Route both hardware and virtual-port input to `receiver`.
    pub fn set_receiver(&self, receiver: Arc<dyn MessageReceiver>) {
        self.inner.hardware.set_receiver(Arc::clone(&receiver));
        self.inner.virtual_port.set_receiver(receiver);
    }

    pub fn clear_receiver(&self) {
        self.inner.hardware.clear_receiver();
        self.inner.virtual_port.clear_receiver();
    }

    /// Stop reading and close the hardware device. Safe to call repeatedly.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.hardware.shutdown()
    }
}

impl std::fmt::Debug for MidiInputContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiInputContext")
            .field("config", &self.inner.config)
            .field("hardware", &self.inner.hardware)
            .field("virtual_port", &self.inner.virtual_port)
            .finish()
    }
}
