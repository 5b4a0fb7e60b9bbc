//! Active/inactive state of the virtual port, reported to the receiver.

use crate::config::NotifyPolicy;
use inlet_midi::ReceiverSlot;
use parking_lot::Mutex;
use tracing::debug;

/// Tracks whether the virtual port has an open input connection.
///
/// The flag itself is edge-triggered: it flips only when the host status
/// differs from it. Whether unchanged callbacks still reach the receiver is
/// decided by [`NotifyPolicy`].
#[derive(Debug)]
pub struct DeviceStatusNotifier {
    receiver: ReceiverSlot,
    // Never held while the receiver runs; receivers may query the port from
    // their callback.
    started: Mutex<bool>,
    policy: NotifyPolicy,
}

impl DeviceStatusNotifier {
    pub fn new(receiver: ReceiverSlot, policy: NotifyPolicy) -> Self {
        Self {
            receiver,
            started: Mutex::new(false),
            policy,
        }
    }

    /// Host callback: is the port's input currently open?
    pub fn on_underlying_status_changed(&self, is_open: bool) {
        let changed = {
            let mut started = self.started.lock();
            let changed = *started != is_open;
            *started = is_open;
            changed
        };
        if changed {
            debug!(
                "Virtual MIDI port {}",
                if is_open { "active" } else { "inactive" }
            );
        }

        if changed || self.policy == NotifyPolicy::Always {
            self.receiver.notify_active(is_open);
        }
    }

    /// Re-send the last known state, e.g. to a freshly attached receiver.
    pub fn announce_current_state(&self) {
        let started = *self.started.lock();
        self.receiver.notify_active(started);
    }

    pub fn is_active(&self) -> bool {
        *self.started.lock()
    }

    pub fn policy(&self) -> NotifyPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inlet_midi::{MessageReceiver, MidiMessage};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Weak};

    #[derive(Default)]
    struct StateLog(Mutex<Vec<bool>>);

    impl MessageReceiver for StateLog {
        fn on_message(&self, _message: &MidiMessage) {}

        fn on_active_state_changed(&self, active: bool) {
            self.0.lock().push(active);
        }
    }

    fn notifier(policy: NotifyPolicy) -> (DeviceStatusNotifier, Arc<StateLog>) {
        let slot = ReceiverSlot::new();
        let log = Arc::new(StateLog::default());
        slot.set(log.clone());
        (DeviceStatusNotifier::new(slot, policy), log)
    }

    #[test]
    fn test_always_policy_repeats_unchanged_state() {
        let (notifier, log) = notifier(NotifyPolicy::Always);
        notifier.on_underlying_status_changed(true);
        notifier.on_underlying_status_changed(true);
        notifier.on_underlying_status_changed(false);
        notifier.on_underlying_status_changed(false);

        assert_eq!(*log.0.lock(), vec![true, true, false, false]);
    }

    #[test]
    fn test_on_change_policy_only_edges() {
        let (notifier, log) = notifier(NotifyPolicy::OnChange);
        notifier.on_underlying_status_changed(false);
        notifier.on_underlying_status_changed(true);
        notifier.on_underlying_status_changed(true);
        notifier.on_underlying_status_changed(false);

        assert_eq!(*log.0.lock(), vec![true, false]);
    }

    #[test]
    fn test_flag_is_edge_triggered() {
        let (notifier, _log) = notifier(NotifyPolicy::Always);
        assert!(!notifier.is_active());
        notifier.on_underlying_status_changed(true);
        notifier.on_underlying_status_changed(true);
        assert!(notifier.is_active());
        notifier.on_underlying_status_changed(false);
        assert!(!notifier.is_active());
    }

    #[test]
    fn test_announce_current_state() {
        let (notifier, log) = notifier(NotifyPolicy::OnChange);
        notifier.announce_current_state();
        notifier.on_underlying_status_changed(true);
        notifier.announce_current_state();

        assert_eq!(*log.0.lock(), vec![false, true, true]);
    }

    /// Receiver that asks the notifier for its state from inside the callback.
    #[derive(Default)]
    struct Reentrant {
        notifier: Mutex<Weak<DeviceStatusNotifier>>,
        seen: Mutex<Vec<(bool, bool)>>,
        resynced: AtomicBool,
    }

    impl MessageReceiver for Reentrant {
        fn on_message(&self, _message: &MidiMessage) {}

        fn on_active_state_changed(&self, active: bool) {
            let notifier = self.notifier.lock().upgrade();
            if let Some(notifier) = notifier {
                self.seen.lock().push((active, notifier.is_active()));
                if !self.resynced.swap(true, Ordering::SeqCst) {
                    notifier.announce_current_state();
                }
            }
        }
    }

    #[test]
    fn test_receiver_may_query_from_callback() {
        let slot = ReceiverSlot::new();
        let receiver = Arc::new(Reentrant::default());
        slot.set(receiver.clone());
        let notifier = Arc::new(DeviceStatusNotifier::new(slot, NotifyPolicy::OnChange));
        *receiver.notifier.lock() = Arc::downgrade(&notifier);

        notifier.on_underlying_status_changed(true);
        notifier.on_underlying_status_changed(false);

        assert_eq!(
            *receiver.seen.lock(),
            vec![(true, true), (true, true), (false, false)]
        );
    }

    #[test]
    fn test_without_receiver() {
        let notifier = DeviceStatusNotifier::new(ReceiverSlot::new(), NotifyPolicy::Always);
        notifier.on_underlying_status_changed(true);
        notifier.announce_current_state();
        assert!(notifier.is_active());
    }
}
