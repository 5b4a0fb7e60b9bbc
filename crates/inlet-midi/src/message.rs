//! Owned MIDI message bytes as forwarded to receivers.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Status nibble of a Note Off message.
pub const NOTE_OFF: u8 = 0x8;
/// Status nibble of a Note On message.
pub const NOTE_ON: u8 = 0x9;
/// Status, key, velocity.
pub const NOTE_MESSAGE_LEN: usize = 3;

/// High nibble of a status byte (message type).
#[inline]
pub fn status_nibble(status: u8) -> u8 {
    (status >> 4) & 0x0F
}

/// True for Note On / Note Off status bytes, any channel.
#[inline]
pub fn is_note_status(status: u8) -> bool {
    matches!(status_nibble(status), NOTE_OFF | NOTE_ON)
}

/// One complete MIDI message, copied out of the transport buffer.
///
/// Channel voice messages fit inline; longer messages (SysEx) spill to the heap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MidiMessage {
    bytes: SmallVec<[u8; 3]>,
}

impl MidiMessage {
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_slice(&[0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F])
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_slice(&[0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F])
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn status(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    #[inline]
    pub fn is_note(&self) -> bool {
        self.status().is_some_and(is_note_status)
    }

    /// Low nibble of the status byte, for channel messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        self.status()
            .filter(|s| (0x80..0xF0).contains(s))
            .map(|s| s & 0x0F)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }
}

impl AsRef<[u8]> for MidiMessage {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<&[u8]> for MidiMessage {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}
