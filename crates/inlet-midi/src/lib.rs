//! MIDI message model for the inlet input subsystem.
//!
//! Provides the validated message type, the receiver capability messages are
//! dispatched to, and a lock-free queue for handing messages to a synth thread.
//!
//! # Example
//!
//! ```
//! use inlet_midi::{validate, ValidationError};
//!
//! let raw = [0x00, 0x90, 60, 100];
//! let msg = validate(&raw, 1, 3).unwrap();
//! assert_eq!(msg.as_bytes(), &[0x90, 60, 100]);
//!
//! assert!(matches!(
//!     validate(&raw, 1, 2),
//!     Err(ValidationError::TooShortForNoteMessage { .. })
//! ));
//! ```

pub mod error;
pub use error::{Result, ValidationError};

mod message;
pub use message::{
    is_note_status, status_nibble, MidiMessage, NOTE_MESSAGE_LEN, NOTE_OFF, NOTE_ON,
};

mod validate;
pub use validate::validate;

mod receiver;
pub use receiver::{MessageReceiver, ReceiverSlot};

pub mod queue;
pub use queue::{message_queue, message_queue_with_capacity, MessageConsumer, QueueReceiver};
