//! Hardware MIDI input via midir.
//!
//! Discovery, opening and a native reading loop on a dedicated thread.
//! Requires the `midi-io` feature.

mod input;

pub use input::{MidirBridge, MidirDiscovery, MidirOpener};
