//! Message validation shared by the hardware and virtual-port paths.
//!
//! The only protocol rule enforced is length: Note On / Note Off messages
//! must carry status, key and velocity. Every other status is passed through
//! untouched so running status, realtime and SysEx data reach the receiver.

use crate::error::{Result, ValidationError};
use crate::message::{is_note_status, MidiMessage, NOTE_MESSAGE_LEN};

/// Copy `raw[offset..offset + count]` into a [`MidiMessage`] after checking it.
///
/// Pure and deterministic.
pub fn validate(raw: &[u8], offset: usize, count: usize) -> Result<MidiMessage> {
    if count == 0 {
        return Err(ValidationError::EmptyMessage);
    }

    let end = offset
        .checked_add(count)
        .filter(|end| *end <= raw.len())
        .ok_or(ValidationError::OutOfBounds {
            offset,
            count,
            len: raw.len(),
        })?;

    let status = raw[offset];
    if is_note_status(status) && count < NOTE_MESSAGE_LEN {
        return Err(ValidationError::TooShortForNoteMessage { status, count });
    }

    Ok(MidiMessage::from_slice(&raw[offset..end]))
}
