//! MidiInputContext builder.

use std::sync::Arc;

use crate::bridge::NativeBridge;
use crate::catalog::{DeviceCatalog, DeviceDiscovery};
use crate::config::InputConfig;
use crate::error::{Error, Result};
use crate::opener::DeviceOpener;
use crate::session::HardwareSessionManager;
use crate::virtual_port::VirtualPort;

use super::{MidiInputContext, MidiInputContextInner};

pub struct MidiInputContextBuilder {
    pub(super) config: InputConfig,
    pub(super) discovery: Option<Arc<dyn DeviceDiscovery>>,
    pub(super) opener: Option<Arc<dyn DeviceOpener>>,
    pub(super) bridge: Option<Arc<dyn NativeBridge>>,
    pub(super) scan: bool,
    #[cfg(feature = "midi-io")]
    pub(super) midir_client: Option<String>,
}

#[allow(clippy::derivable_impls)]
impl Default for MidiInputContextBuilder {
    fn default() -> Self {
        Self {
            config: InputConfig::default(),
            discovery: None,
            opener: None,
            bridge: None,
            scan: false,
            #[cfg(feature = "midi-io")]
            midir_client: None,
        }
    }
}

impl MidiInputContextBuilder {
    pub fn config(mut self, config: InputConfig) -> Self {
        self.config = config;
        self
    }

    pub fn discovery(mut self, discovery: Arc<dyn DeviceDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn opener(mut self, opener: Arc<dyn DeviceOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Native reading loop. Can also be installed later on the hardware
    /// session.
    pub fn bridge(mut self, bridge: Arc<dyn NativeBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Populate the catalog during `build`.
    pub fn scan_on_build(mut self) -> Self {
        self.scan = true;
        self
    }

    /// Use midir for discovery, opening and reading. Explicit collaborators
    /// set on the builder take precedence.
    #[cfg(feature = "midi-io")]
    pub fn midir(mut self, client_name: impl Into<String>) -> Self {
        self.midir_client = Some(client_name.into());
        self
    }

    pub fn build(self) -> Result<MidiInputContext> {
        #[cfg(feature = "midi-io")]
        let (discovery, opener) = match &self.midir_client {
            Some(client) => (
                self.discovery.or_else(|| {
                    Some(Arc::new(crate::io::MidirDiscovery::new(client.clone()))
                        as Arc<dyn DeviceDiscovery>)
                }),
                self.opener.or_else(|| {
                    Some(Arc::new(crate::io::MidirOpener::new(client.clone()))
                        as Arc<dyn DeviceOpener>)
                }),
            ),
            None => (self.discovery, self.opener),
        };
        #[cfg(not(feature = "midi-io"))]
        let (discovery, opener) = (self.discovery, self.opener);

        let discovery = discovery
            .ok_or_else(|| Error::InvalidConfig("no device discovery configured".to_string()))?;
        let opener =
            opener.ok_or_else(|| Error::InvalidConfig("no device opener configured".to_string()))?;

        let hardware =
            HardwareSessionManager::new(Arc::new(DeviceCatalog::new()), opener, self.config.clone());

        #[cfg(feature = "midi-io")]
        let bridge = match (self.bridge, &self.midir_client) {
            (Some(bridge), _) => Some(bridge),
            (None, Some(client)) => {
                if self.config.port_number != 0 {
                    return Err(Error::InvalidConfig(format!(
                        "midir devices have a single port, got port {}",
                        self.config.port_number
                    )));
                }
                Some(Arc::new(crate::io::MidirBridge::new(client.clone(), hardware.sink())?)
                    as Arc<dyn NativeBridge>)
            }
            (None, None) => None,
        };
        #[cfg(not(feature = "midi-io"))]
        let bridge = self.bridge;

        if let Some(bridge) = bridge {
            hardware.set_native_setup_handler(bridge);
            hardware.init_native()?;
        }

        if self.scan {
            hardware.scan(&*discovery);
        }

        Ok(MidiInputContext {
            inner: Arc::new(MidiInputContextInner {
                virtual_port: VirtualPort::new(self.config.notify_policy),
                config: self.config,
                discovery,
                hardware,
            }),
        })
    }
}
