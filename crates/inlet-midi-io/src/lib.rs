//! MIDI input subsystem for the inlet engine.
//!
//! Catalogs hardware devices, runs the hardware session (open, close, native
//! reading loop) and adapts the app's virtual port. Everything received ends
//! up at one [`MessageReceiver`].
//!
//! Feature gates: `midi-io` (midir-backed discovery, opening and reading).

pub mod error;
pub use error::{Error, Result};

mod device;
pub use device::{DeviceDescriptor, DeviceHandle, DeviceId, DeviceInfo};

mod catalog;
pub use catalog::{DeviceCatalog, DeviceDiscovery};

mod bridge;
pub use bridge::NativeBridge;

mod opener;
pub use opener::{DeviceOpener, OpenCompletion, PendingOpen};

mod config;
pub use config::{InputConfig, NotifyPolicy, OpenPolicy};

mod stats;
pub use stats::DispatchSnapshot;

mod session;
pub use session::{HardwareSessionManager, NativeSink, SessionState};

mod software;
pub use software::SoftwareReceiverAdapter;

mod status;
pub use status::DeviceStatusNotifier;

mod virtual_port;
pub use virtual_port::VirtualPort;

mod system;
pub use system::{MidiInputContext, MidiInputContextBuilder};

#[cfg(feature = "midi-io")]
pub(crate) mod io;

#[cfg(feature = "midi-io")]
pub use io::{MidirBridge, MidirDiscovery, MidirOpener};

pub use inlet_midi::{
    message_queue, message_queue_with_capacity, validate, MessageConsumer, MessageReceiver,
    MidiMessage, QueueReceiver, ReceiverSlot, ValidationError,
};
