//! Centralized error type for the inlet umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("MIDI: {0}")]
    Midi(#[from] inlet_midi_io::Error),

    #[error("MIDI message: {0}")]
    Message(#[from] inlet_midi::ValidationError),
}

pub type Result<T> = std::result::Result<T, Error>;
