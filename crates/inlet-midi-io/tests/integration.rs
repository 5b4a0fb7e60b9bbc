//! Integration tests for inlet-midi-io.
//!
//! These tests exercise multi-component workflows with mock host collaborators
//! instead of hardware MIDI devices.

use inlet_midi_io::{
    message_queue, DeviceDescriptor, DeviceHandle, DeviceInfo, DeviceOpener, Error, InputConfig,
    MessageReceiver, MidiInputContext, MidiMessage, NativeBridge, NotifyPolicy, OpenCompletion,
    OpenPolicy, SessionState,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Host whose device list can change between scans.
#[derive(Default)]
struct HostDevices(Mutex<Vec<DeviceInfo>>);

impl HostDevices {
    fn with(devices: Vec<DeviceInfo>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(devices)))
    }

    fn replace(&self, devices: Vec<DeviceInfo>) {
        *self.0.lock() = devices;
    }
}

impl inlet_midi_io::DeviceDiscovery for HostDevices {
    fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        self.0.lock().clone()
    }
}

/// Opens every device on a separate "host" thread, after a short delay.
struct ThreadedOpener {
    refuse: AtomicBool,
}

impl ThreadedOpener {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            refuse: AtomicBool::new(false),
        })
    }
}

impl DeviceOpener for ThreadedOpener {
    fn open_device(&self, descriptor: &DeviceDescriptor, completion: OpenCompletion) {
        let refuse = self.refuse.load(Ordering::Relaxed);
        let descriptor = descriptor.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            if refuse {
                completion.rejected("user denied access");
            } else {
                completion.opened(DeviceHandle::new(descriptor, 42));
            }
        });
    }
}

#[derive(Default)]
struct RecordingBridge {
    calls: Mutex<Vec<String>>,
}

impl NativeBridge for RecordingBridge {
    fn start_reading(&self, device: &DeviceHandle, port: usize) -> inlet_midi_io::Result<()> {
        self.calls
            .lock()
            .push(format!("start {} {}", device.name(), port));
        Ok(())
    }

    fn stop_reading(&self) -> inlet_midi_io::Result<()> {
        self.calls.lock().push("stop".to_string());
        Ok(())
    }
}

#[derive(Default)]
struct Collector {
    messages: Mutex<Vec<Vec<u8>>>,
    states: Mutex<Vec<bool>>,
}

impl MessageReceiver for Collector {
    fn on_message(&self, message: &MidiMessage) {
        self.messages.lock().push(message.as_bytes().to_vec());
    }

    fn on_active_state_changed(&self, active: bool) {
        self.states.lock().push(active);
    }
}

fn studio() -> Vec<DeviceInfo> {
    vec![
        DeviceInfo::new(10, "Keystation 61", 1),
        DeviceInfo::unnamed(11, 1),
        DeviceInfo::new(12, "Audio Interface", 0),
        DeviceInfo::new(13, "MPK mini", 1),
    ]
}

fn build(
    config: InputConfig,
) -> (
    MidiInputContext,
    Arc<HostDevices>,
    Arc<ThreadedOpener>,
    Arc<RecordingBridge>,
) {
    let host = HostDevices::with(studio());
    let opener = ThreadedOpener::new();
    let bridge = Arc::new(RecordingBridge::default());
    let input = MidiInputContext::builder()
        .config(config)
        .discovery(host.clone())
        .opener(opener.clone())
        .bridge(bridge.clone())
        .build()
        .unwrap();
    (input, host, opener, bridge)
}

// ---------------------------------------------------------------------------
// 1. Hardware: scan -> open -> native messages -> receiver
// ---------------------------------------------------------------------------

#[test]
fn test_hardware_flow_end_to_end() {
    init_tracing();
    let (input, _host, _opener, bridge) = build(InputConfig::default());
    let collector = Arc::new(Collector::default());
    input.set_receiver(collector.clone());

    let devices = input.scan_devices();
    let names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Keystation 61", "MPK mini"]);
    assert_eq!(input.hardware().state(), SessionState::Catalogued);

    let pending = input.open_device_by_name("mpk").unwrap();
    assert_eq!(pending.descriptor().name, "MPK mini");
    let handle = pending.wait_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(handle.token(), 42);
    assert_eq!(input.hardware().state(), SessionState::Reading);
    assert_eq!(*bridge.calls.lock(), vec!["start MPK mini 0"]);

    // The native loop delivers on its own thread.
    let sink = input.hardware().sink();
    thread::spawn(move || {
        sink.deliver(&[0x90, 48, 80]);
        sink.deliver(&[0xB0, 1, 64]);
        sink.deliver_range(&[0xFF, 0x80, 48, 0], 1, 3, 123_456);
    })
    .join()
    .unwrap();

    assert_eq!(
        *collector.messages.lock(),
        vec![vec![0x90, 48, 80], vec![0xB0, 1, 64], vec![0x80, 48, 0]]
    );
    assert_eq!(input.hardware().stats().forwarded, 3);

    input.shutdown().unwrap();
    assert!(!input.hardware().is_reading());
    assert_eq!(bridge.calls.lock().last().map(String::as_str), Some("stop"));
    // Idempotent.
    input.shutdown().unwrap();
}

#[test]
fn test_unknown_device_name() {
    let (input, _host, _opener, _bridge) = build(InputConfig::default());
    input.scan_devices();
    let err = input.open_device_by_name("Launchkey").unwrap_err();
    assert!(matches!(err, Error::MidiDevice(_)));
}

#[test]
fn test_host_refusal_reported_not_retried() {
    let (input, _host, opener, bridge) = build(InputConfig::default());
    opener.refuse.store(true, Ordering::Relaxed);
    input.scan_devices();

    let err = input
        .open_device_by_name("Keystation")
        .unwrap()
        .wait_timeout(Duration::from_secs(5))
        .unwrap_err();

    assert!(matches!(err, Error::OpenRejected { ref reason, .. } if reason == "user denied access"));
    assert_eq!(input.hardware().state(), SessionState::Idle);
    assert!(bridge.calls.lock().is_empty());

    // Nothing further happens on its own.
    thread::sleep(Duration::from_millis(30));
    assert!(bridge.calls.lock().is_empty());
}

#[test]
fn test_reject_policy_keeps_first_device() {
    let config = InputConfig {
        open_policy: OpenPolicy::Reject,
        ..Default::default()
    };
    let (input, _host, _opener, _bridge) = build(config);
    input.scan_devices();

    input
        .open_device_by_name("Keystation")
        .unwrap()
        .wait_timeout(Duration::from_secs(5))
        .unwrap();
    let err = input.open_device_by_name("MPK").unwrap_err();
    assert!(matches!(err, Error::SessionBusy { .. }));

    // Close first, then the second open is accepted.
    input.hardware().stop_reading().unwrap();
    input.hardware().close();
    input
        .open_device_by_name("MPK")
        .unwrap()
        .wait_timeout(Duration::from_secs(5))
        .unwrap();
    assert_eq!(input.hardware().open_device().unwrap().name(), "MPK mini");
}

// ---------------------------------------------------------------------------
// 2. Device list changes
// ---------------------------------------------------------------------------

#[test]
fn test_unplug_and_auto_reopen() {
    init_tracing();
    let config = InputConfig {
        auto_open_first: true,
        ..Default::default()
    };
    let (input, host, _opener, bridge) = build(config);

    let first = input.on_device_list_changed().unwrap().unwrap();
    first.wait_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(input.hardware().open_device().unwrap().name(), "Keystation 61");

    // Keystation unplugged; MPK remains and is opened instead.
    host.replace(vec![DeviceInfo::new(13, "MPK mini", 1)]);
    let second = input.on_device_list_changed().unwrap().unwrap();
    second.wait_timeout(Duration::from_secs(5)).unwrap();

    assert_eq!(input.hardware().open_device().unwrap().name(), "MPK mini");
    assert_eq!(
        *bridge.calls.lock(),
        vec!["start Keystation 61 0", "stop", "start MPK mini 0"]
    );
}

// ---------------------------------------------------------------------------
// 3. Virtual port
// ---------------------------------------------------------------------------

#[test]
fn test_virtual_port_into_queue() {
    let (input, _host, _opener, _bridge) = build(InputConfig::default());
    let (receiver, mut consumer) = message_queue();
    let receiver = Arc::new(receiver);
    input.set_receiver(receiver.clone());

    let port = input.virtual_port();
    port.on_device_status_changed(true);
    assert!(receiver.is_active());

    let adapter = port.input_port_receiver(0).unwrap();
    let packet = [0x90, 60, 100, 0x90, 62, 0x80, 60, 0];
    adapter.on_incoming(&packet, 0, 3, 10);
    adapter.on_incoming(&packet, 3, 2, 20); // short note, dropped
    adapter.on_incoming(&packet, 5, 3, 30);
    adapter.on_incoming(&packet, 6, 3, 40); // past the end, dropped

    let drained: Vec<Vec<u8>> = consumer.drain_all().into_iter().map(|m| m.into_vec()).collect();
    assert_eq!(drained, vec![vec![0x90, 60, 100], vec![0x80, 60, 0]]);
    assert_eq!(port.stats().rejected, 2);
    assert!(!consumer.has_pending());
}

#[test]
fn test_virtual_port_status_policies() {
    for (policy, expected) in [
        (NotifyPolicy::Always, vec![true, true, false]),
        (NotifyPolicy::OnChange, vec![true, false]),
    ] {
        let config = InputConfig {
            notify_policy: policy,
            ..Default::default()
        };
        let (input, _host, _opener, _bridge) = build(config);
        let collector = Arc::new(Collector::default());
        input.virtual_port().set_receiver(collector.clone());

        input.virtual_port().on_device_status_changed(true);
        input.virtual_port().on_device_status_changed(true);
        input.virtual_port().on_device_status_changed(false);

        assert_eq!(*collector.states.lock(), expected, "{:?}", policy);
    }
}

// ---------------------------------------------------------------------------
// 4. Concurrency
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Counter(AtomicUsize);

impl MessageReceiver for Counter {
    fn on_message(&self, _message: &MidiMessage) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

/// Hardware and virtual-port threads deliver while the receiver is swapped.
/// Every message lands at exactly one receiver.
#[test]
fn test_concurrent_delivery_with_receiver_swaps() {
    const PER_THREAD: usize = 2_000;

    let (input, _host, _opener, _bridge) = build(InputConfig::default());
    let a = Arc::new(Counter::default());
    let b = Arc::new(Counter::default());
    input.set_receiver(a.clone());

    let sink = input.hardware().sink();
    let hardware = thread::spawn(move || {
        for i in 0..PER_THREAD {
            sink.deliver(&[0x90, (i % 128) as u8, 100]);
        }
    });

    let software_input = input.clone();
    let software = thread::spawn(move || {
        for i in 0..PER_THREAD {
            software_input
                .virtual_port()
                .on_incoming(&[0x80, (i % 128) as u8, 0], 0, 3, i as i64);
        }
    });

    for i in 0..200 {
        if i % 2 == 0 {
            input.set_receiver(b.clone());
        } else {
            input.set_receiver(a.clone());
        }
        thread::yield_now();
    }

    hardware.join().unwrap();
    software.join().unwrap();

    let total = a.0.load(Ordering::Relaxed) + b.0.load(Ordering::Relaxed);
    assert_eq!(total, PER_THREAD * 2);
}
