//! midir-backed collaborators for the hardware session.

use crate::bridge::NativeBridge;
use crate::catalog::DeviceDiscovery;
use crate::device::{DeviceDescriptor, DeviceHandle, DeviceInfo};
use crate::error::{Error, Result};
use crate::opener::{DeviceOpener, OpenCompletion};
use crate::session::NativeSink;
use crossbeam_channel::{bounded, Receiver, Sender};
use midir::{MidiInput, MidiInputConnection};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Each midir input port is reported as a device with one port.
#[derive(Debug, Clone)]
pub struct MidirDiscovery {
    client_name: String,
}

impl MidirDiscovery {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }
}

impl DeviceDiscovery for MidirDiscovery {
    fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        let midi_input = match MidiInput::new(&self.client_name) {
            Ok(input) => input,
            Err(e) => {
                warn!("Cannot enumerate MIDI inputs: {}", e);
                return Vec::new();
            }
        };

        midi_input
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| match midi_input.port_name(port) {
                Ok(name) => DeviceInfo::new(index as u64, name, 1),
                Err(_) => DeviceInfo::unnamed(index as u64, 1),
            })
            .collect()
    }
}

/// Resolves the catalogued device to a current midir port and completes
/// immediately. The handle token is the midir port index.
#[derive(Debug, Clone)]
pub struct MidirOpener {
    client_name: String,
}

impl MidirOpener {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    // Port indices shift when devices come and go; match by name first.
    fn resolve(&self, descriptor: &DeviceDescriptor) -> Result<u64> {
        let midi_input = MidiInput::new(&self.client_name)?;
        let names: Vec<Option<String>> = midi_input
            .ports()
            .iter()
            .map(|port| midi_input.port_name(port).ok())
            .collect();

        names
            .iter()
            .position(|name| name.as_deref() == Some(descriptor.name.as_str()))
            .map(|index| index as u64)
            .ok_or_else(|| Error::MidiDevice(format!("'{}' is no longer present", descriptor.name)))
    }
}

impl DeviceOpener for MidirOpener {
    fn open_device(&self, descriptor: &DeviceDescriptor, completion: OpenCompletion) {
        match self.resolve(descriptor) {
            Ok(index) => completion.opened(DeviceHandle::new(descriptor.clone(), index)),
            Err(e) => completion.rejected(e.to_string()),
        }
    }
}

/// Commands sent to the MIDI input thread
enum MidiCommand {
    Start {
        port_index: usize,
        device_name: String,
        reply: Sender<Result<()>>,
    },
    Stop,
    Shutdown,
}

/// Native reading loop owning the midir connection on its own thread.
pub struct MidirBridge {
    command_sender: Sender<MidiCommand>,
}

impl MidirBridge {
    pub fn new(client_name: impl Into<String>, sink: NativeSink) -> Result<Self> {
        let (command_sender, command_receiver) = bounded(16);
        let client_name = client_name.into();

        thread::Builder::new()
            .name("midi-input-thread".to_string())
            .spawn(move || Self::midi_thread(client_name, command_receiver, sink))
            .map_err(|e| Error::Bridge(format!("failed to spawn MIDI input thread: {}", e)))?;

        Ok(Self { command_sender })
    }

    fn midi_thread(client_name: String, command_receiver: Receiver<MidiCommand>, sink: NativeSink) {
        let mut connection: Option<MidiInputConnection<()>> = None;

        loop {
            match command_receiver.recv_timeout(Duration::from_millis(100)) {
                Ok(MidiCommand::Start {
                    port_index,
                    device_name,
                    reply,
                }) => {
                    if let Some(conn) = connection.take() {
                        conn.close();
                    }
                    let result = Self::connect(&client_name, port_index, sink.clone()).map(|conn| {
                        debug!("midir connected to '{}'", device_name);
                        connection = Some(conn);
                    });
                    let _ = reply.send(result);
                }
                Ok(MidiCommand::Stop) => {
                    if let Some(conn) = connection.take() {
                        conn.close();
                    }
                }
                Ok(MidiCommand::Shutdown) => {
                    if let Some(conn) = connection.take() {
                        conn.close();
                    }
                    break;
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn connect(
        client_name: &str,
        port_index: usize,
        sink: NativeSink,
    ) -> Result<MidiInputConnection<()>> {
        let midi_input = MidiInput::new(client_name)?;
        let ports = midi_input.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| Error::MidiDevice(format!("MIDI input {} not found", port_index)))?;

        let connection = midi_input.connect(
            port,
            "inlet-input",
            move |_timestamp, message, _| {
                sink.deliver(message);
            },
            (),
        )?;
        Ok(connection)
    }

    fn send(&self, command: MidiCommand) -> Result<()> {
        self.command_sender
            .send(command)
            .map_err(|_| Error::Bridge("MIDI input thread has exited".to_string()))
    }
}

impl NativeBridge for MidirBridge {
    fn start_reading(&self, device: &DeviceHandle, port: usize) -> Result<()> {
        if port != 0 {
            return Err(Error::MidiPort(format!(
                "'{}' has a single port, got port {}",
                device.name(),
                port
            )));
        }

        let port_index = usize::try_from(device.token())
            .map_err(|_| Error::MidiPort(format!("invalid port token {}", device.token())))?;
        let (reply, result) = bounded(1);
        self.send(MidiCommand::Start {
            port_index,
            device_name: device.name().to_string(),
            reply,
        })?;
        result
            .recv()
            .map_err(|_| Error::Bridge("MIDI input thread has exited".to_string()))?
    }

    fn stop_reading(&self) -> Result<()> {
        self.send(MidiCommand::Stop)
    }
}

impl Drop for MidirBridge {
    fn drop(&mut self) {
        let _ = self.command_sender.send(MidiCommand::Shutdown);
    }
}

impl std::fmt::Debug for MidirBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidirBridge").finish_non_exhaustive()
    }
}
