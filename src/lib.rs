//! # Inlet - MIDI input ingestion
//!
//! Brings MIDI into an app from two places and hands every message to one
//! receiver:
//!
//! - **hardware** - USB/Bluetooth devices, cataloged, opened through the
//!   host and read by a native loop
//! - **virtual port** - the app's own port, fed by other applications
//!
//! ## Architecture
//!
//! Inlet is an umbrella crate that coordinates:
//! - **inlet-midi** - Message model, validation, receiver slot, lock-free queue
//! - **inlet-midi-io** - Device catalog, hardware session, virtual port, midir backend
//!
//! ## Quick Start
//!
//! ```ignore
//! use inlet::prelude::*;
//!
//! let input = MidiInputContext::builder()
//!     .discovery(host_discovery)
//!     .opener(host_opener)
//!     .bridge(native_loop)
//!     .scan_on_build()
//!     .build()?;
//!
//! let (receiver, mut consumer) = message_queue();
//! input.set_receiver(Arc::new(receiver));
//! input.open_device_by_name("Keystation")?.wait()?;
//!
//! // Synthesis thread
//! for message in consumer.drain_all() { /* ... */ }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Host-provided collaborators only
//! - `midi-hardware` - midir-backed discovery, opening and reading

mod error;
pub use error::{Error, Result};

/// Re-export of inlet-midi for direct access
pub use inlet_midi as message;

/// Re-export of inlet-midi-io for direct access
pub use inlet_midi_io as midi;

pub use inlet_midi::{
    message_queue, message_queue_with_capacity, validate, MessageConsumer, MessageReceiver,
    MidiMessage, QueueReceiver, ValidationError,
};

pub use inlet_midi_io::{
    DeviceCatalog, DeviceDescriptor, DeviceDiscovery, DeviceHandle, DeviceInfo, DeviceOpener,
    HardwareSessionManager, InputConfig, MidiInputContext, MidiInputContextBuilder, NativeBridge,
    NativeSink, NotifyPolicy, OpenCompletion, OpenPolicy, PendingOpen, SessionState, VirtualPort,
};

#[cfg(feature = "midi-hardware")]
pub use inlet_midi_io::{MidirBridge, MidirDiscovery, MidirOpener};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Error, Result};

    // Entry point
    pub use crate::{InputConfig, MidiInputContext, MidiInputContextBuilder};

    // Host collaborators
    pub use crate::{
        DeviceDescriptor, DeviceDiscovery, DeviceHandle, DeviceInfo, DeviceOpener, NativeBridge,
        OpenCompletion,
    };

    // Messages
    pub use crate::{message_queue, MessageConsumer, MessageReceiver, MidiMessage};

    pub use std::sync::Arc;
}
