//! Error types for MIDI message validation.

use thiserror::Error;

/// Reasons a raw byte slice is refused as a MIDI message.
///
/// Validation failures are recovered locally by the dispatch paths: the
/// message is logged and dropped, and the stream continues.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty MIDI message")]
    EmptyMessage,

    #[error("note message with status {status:#04x} needs 3 bytes, got {count}")]
    TooShortForNoteMessage { status: u8, count: usize },

    #[error("{count} bytes at offset {offset} exceed buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        count: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
