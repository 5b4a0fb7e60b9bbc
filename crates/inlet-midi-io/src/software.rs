//! Virtual (software) port: messages from other applications on the host.

use crate::stats::{DispatchSnapshot, DispatchStats};
use inlet_midi::{validate, MessageReceiver, ReceiverSlot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Receives raw bytes from the host's virtual-port framework, validates them
/// and forwards them while transmission is enabled.
#[derive(Debug)]
pub struct SoftwareReceiverAdapter {
    receiver: ReceiverSlot,
    transmit_enabled: AtomicBool,
    stats: DispatchStats,
}

impl SoftwareReceiverAdapter {
    pub fn new() -> Self {
        Self::with_slot(ReceiverSlot::new())
    }

    pub(crate) fn with_slot(receiver: ReceiverSlot) -> Self {
        Self {
            receiver,
            transmit_enabled: AtomicBool::new(true),
            stats: DispatchStats::default(),
        }
    }

    /// Entry point for the host framework. `timestamp_nanos` is not used for
    /// ordering or deduplication.
    pub fn on_incoming(&self, raw: &[u8], offset: usize, count: usize, _timestamp_nanos: i64) {
        if count == 0 {
            return;
        }
        if !self.receiver.is_set() {
            self.stats.unrouted();
            return;
        }
        if !self.is_transmit_enabled() {
            self.stats.gated();
            return;
        }

        match validate(raw, offset, count) {
            Ok(message) => {
                if self.receiver.dispatch(&message) {
                    self.stats.forwarded();
                } else {
                    self.stats.unrouted();
                }
            }
            Err(e) => {
                self.stats.rejected();
                debug!("Dropping software MIDI message: {}", e);
            }
        }
    }

    /// Affects messages arriving after the call; disabled messages are
    /// discarded, not buffered.
    pub fn set_transmit_enabled(&self, enabled: bool) {
        self.transmit_enabled.store(enabled, Ordering::Release);
    }

    #[inline]
    pub fn is_transmit_enabled(&self) -> bool {
        self.transmit_enabled.load(Ordering::Acquire)
    }

    pub fn set_receiver(&self, receiver: Arc<dyn MessageReceiver>) {
        debug!("Set software MIDI receiver");
        self.receiver.set(receiver);
    }

    pub fn clear_receiver(&self) {
        self.receiver.clear();
    }

    pub fn has_receiver(&self) -> bool {
        self.receiver.is_set()
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.stats.snapshot()
    }
}

impl Default for SoftwareReceiverAdapter {
    fn default() -> Self {
        Self::new()
    }
}
