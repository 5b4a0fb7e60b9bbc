//! Downstream receiver capability and the slot dispatchers read it from.

use crate::message::MidiMessage;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Consumer of dispatched MIDI messages (typically the synthesis layer).
///
/// Called from transport threads (native reader, virtual-port framework),
/// never from the thread that installed the receiver.
pub trait MessageReceiver: Send + Sync {
    fn on_message(&self, message: &MidiMessage);

    /// Virtual port gained or lost its input connection.
    fn on_active_state_changed(&self, _active: bool) {}
}

/// Lock-free holder for the current receiver.
///
/// Setters run on the application thread, loads on transport threads. The
/// swap is atomic, so a dispatch sees either the old or the new receiver,
/// never a torn reference. Clones share the same slot.
#[derive(Clone, Default)]
pub struct ReceiverSlot {
    // arc-swap needs a sized pointee, hence the double Arc.
    current: Arc<ArcSwapOption<Arc<dyn MessageReceiver>>>,
}

impl ReceiverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes effect for the next message; nothing is buffered for it.
    pub fn set(&self, receiver: Arc<dyn MessageReceiver>) {
        self.current.store(Some(Arc::new(receiver)));
    }

    pub fn clear(&self) {
        self.current.store(None);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.current.load().is_some()
    }

    pub fn get(&self) -> Option<Arc<dyn MessageReceiver>> {
        self.current.load_full().map(|r| Arc::clone(&*r))
    }

    /// Deliver to the current receiver. Returns `false` when none is set.
    #[inline]
    pub fn dispatch(&self, message: &MidiMessage) -> bool {
        match &*self.current.load() {
            Some(receiver) => {
                receiver.on_message(message);
                true
            }
            None => false,
        }
    }

    /// Returns `false` when no receiver is set.
    #[inline]
    pub fn notify_active(&self, active: bool) -> bool {
        match &*self.current.load() {
            Some(receiver) => {
                receiver.on_active_state_changed(active);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ReceiverSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}
