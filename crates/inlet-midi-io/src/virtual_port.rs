//! The app's own virtual MIDI port, visible to other applications.

use crate::config::NotifyPolicy;
use crate::software::SoftwareReceiverAdapter;
use crate::stats::DispatchSnapshot;
use crate::status::DeviceStatusNotifier;
use inlet_midi::{MessageReceiver, ReceiverSlot};
use std::sync::Arc;

/// Virtual port with a single input port (index 0).
///
/// Messages and active-state changes go to the same receiver.
#[derive(Debug)]
pub struct VirtualPort {
    receiver: ReceiverSlot,
    adapter: SoftwareReceiverAdapter,
    status: DeviceStatusNotifier,
}

impl VirtualPort {
    pub fn new(notify_policy: NotifyPolicy) -> Self {
        let receiver = ReceiverSlot::new();
        Self {
            adapter: SoftwareReceiverAdapter::with_slot(receiver.clone()),
            status: DeviceStatusNotifier::new(receiver.clone(), notify_policy),
            receiver,
        }
    }

    /// Host asks which adapter serves an input port. Only port 0 exists.
    pub fn input_port_receiver(&self, port: usize) -> Option<&SoftwareReceiverAdapter> {
        (port == 0).then_some(&self.adapter)
    }

    pub fn adapter(&self) -> &SoftwareReceiverAdapter {
        &self.adapter
    }

    pub fn status(&self) -> &DeviceStatusNotifier {
        &self.status
    }

    // ==================== Host callbacks ====================

    pub fn on_incoming(&self, raw: &[u8], offset: usize, count: usize, timestamp_nanos: i64) {
        self.adapter.on_incoming(raw, offset, count, timestamp_nanos);
    }

    /// The host reports whether the port's input is connected.
    pub fn on_device_status_changed(&self, input_port_open: bool) {
        self.status.on_underlying_status_changed(input_port_open);
    }

    // ==================== Application side ====================

    pub fn set_receiver(&self, receiver: Arc<dyn MessageReceiver>) {
        self.receiver.set(receiver);
    }

    pub fn clear_receiver(&self) {
        self.receiver.clear();
    }

    pub fn has_receiver(&self) -> bool {
        self.receiver.is_set()
    }

    pub fn set_transmit_enabled(&self, enabled: bool) {
        self.adapter.set_transmit_enabled(enabled);
    }

    pub fn is_transmit_enabled(&self) -> bool {
        self.adapter.is_transmit_enabled()
    }

    /// Re-announce the current active state to the receiver.
    pub fn check_device_status(&self) {
        self.status.announce_current_state();
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.adapter.stats()
    }
}

impl Default for VirtualPort {
    fn default() -> Self {
        Self::new(NotifyPolicy::default())
    }
}
