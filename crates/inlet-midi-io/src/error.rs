//! Error types for the MIDI input subsystem.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("native MIDI bridge not installed")]
    BridgeNotInstalled,

    #[error("device '{open}' is already open, refusing to open '{requested}'")]
    SessionBusy { open: String, requested: String },

    #[error("device '{device}' could not be opened: {reason}")]
    OpenRejected { device: String, reason: String },

    #[error("open request for '{0}' has not completed")]
    OpenPending(String),

    #[error("native bridge error: {0}")]
    Bridge(String),

    #[error(transparent)]
    Validation(#[from] inlet_midi::ValidationError),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
