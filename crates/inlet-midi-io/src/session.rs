//! Hardware MIDI session: device selection, open/close, native reading loop.
//!
//! One session reads from at most one device. Messages delivered by the
//! native bridge are forwarded to the receiver on the bridge's own thread, in
//! the order the bridge produced them.

use crate::bridge::NativeBridge;
use crate::catalog::{DeviceCatalog, DeviceDiscovery};
use crate::config::{InputConfig, OpenPolicy};
use crate::device::{DeviceDescriptor, DeviceHandle};
use crate::error::{Error, Result};
use crate::opener::{DeviceOpener, OpenCompletion, PendingOpen};
use crate::stats::{DispatchSnapshot, DispatchStats};
use arc_swap::ArcSwapOption;
use inlet_midi::{validate, MessageReceiver, MidiMessage, ReceiverSlot};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not reading. A device can still be held after `stop_reading` until
    /// `close`; see [`HardwareSessionManager::open_device`].
    Idle,
    /// A scan has run; nothing is open.
    Catalogued,
    /// Open request sent to the host, completion outstanding.
    Opening,
    /// Device open and the native loop told to read it.
    Reading,
}

#[derive(Debug)]
struct Session {
    state: SessionState,
    open_device: Option<DeviceHandle>,
    /// (request id, device) of the outstanding open request.
    opening: Option<(u64, DeviceDescriptor)>,
    /// The bridge was told to start and not yet told to stop.
    reading: bool,
}

impl Session {
    fn busy_with(&self) -> Option<&str> {
        self.open_device
            .as_ref()
            .map(|d| d.name())
            .or_else(|| self.opening.as_ref().map(|(_, d)| d.name.as_str()))
    }
}

pub(crate) struct SessionInner {
    catalog: Arc<DeviceCatalog>,
    opener: Arc<dyn DeviceOpener>,
    // Double Arc: arc-swap needs a sized pointee.
    bridge: ArcSwapOption<Arc<dyn NativeBridge>>,
    receiver: ReceiverSlot,
    session: Mutex<Session>,
    next_request: AtomicU64,
    config: InputConfig,
    stats: DispatchStats,
}

impl SessionInner {
    fn bridge(&self) -> Result<Arc<dyn NativeBridge>> {
        self.bridge
            .load_full()
            .map(|b| Arc::clone(&*b))
            .ok_or(Error::BridgeNotInstalled)
    }

    fn start_reading(&self, device: &DeviceHandle, port: usize) -> Result<()> {
        self.bridge()?.start_reading(device, port)?;

        let mut session = self.session.lock();
        session.reading = true;
        if session.open_device.as_ref().map(|d| d.id()) == Some(device.id()) {
            session.state = SessionState::Reading;
        }
        debug!("Reading MIDI device '{}' port {}", device.name(), port);
        Ok(())
    }

    fn stop_reading(&self) -> Result<()> {
        self.bridge()?.stop_reading()?;

        let mut session = self.session.lock();
        session.reading = false;
        if session.state == SessionState::Reading {
            session.state = SessionState::Idle;
        }
        debug!("Stopped native MIDI reading");
        Ok(())
    }

    /// Called from [`OpenCompletion`] on the host's thread.
    pub(crate) fn complete_open(
        &self,
        request: u64,
        device_name: &str,
        outcome: Result<DeviceHandle>,
    ) -> Result<DeviceHandle> {
        let mut session = self.session.lock();
        let descriptor = match session.opening.take() {
            Some((id, descriptor)) if id == request => descriptor,
            other => {
                session.opening = other;
                drop(session);
                debug!("Ignoring completion of superseded open request {}", request);
                return Err(Error::OpenRejected {
                    device: device_name.to_string(),
                    reason: "superseded by a later request".to_string(),
                });
            }
        };

        let device = match outcome {
            Ok(device) => device,
            Err(e) => {
                session.state = SessionState::Idle;
                drop(session);
                warn!("MIDI device '{}' was not opened: {}", descriptor.name, e);
                return Err(e);
            }
        };

        session.open_device = Some(device.clone());
        drop(session);
        debug!("Opened MIDI device '{}'", device.name());

        if let Err(e) = self.start_reading(&device, self.config.port_number) {
            let mut session = self.session.lock();
            if session.open_device.as_ref() == Some(&device) {
                session.open_device = None;
                session.state = SessionState::Idle;
            }
            drop(session);
            warn!("Could not start reading '{}': {}", device.name(), e);
            return Err(e);
        }
        Ok(device)
    }

    fn on_native_message(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            trace!("Dropping empty native MIDI message");
            return;
        }
        if !self.receiver.is_set() {
            self.stats.unrouted();
            trace!("No MIDI receiver, dropping {:02x?}", bytes);
            return;
        }

        let message = if self.config.validate_hardware {
            match validate(bytes, 0, bytes.len()) {
                Ok(message) => message,
                Err(e) => {
                    self.stats.rejected();
                    debug!("Dropping hardware MIDI message: {}", e);
                    return;
                }
            }
        } else {
            MidiMessage::from_slice(bytes)
        };

        if self.receiver.dispatch(&message) {
            self.stats.forwarded();
        } else {
            self.stats.unrouted();
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if self.session.get_mut().reading {
            if let Some(bridge) = self.bridge.load_full() {
                let _ = bridge.stop_reading();
            }
        }
    }
}

/// Hardware session manager. Clone is cheap (Arc internally).
#[derive(Clone)]
pub struct HardwareSessionManager {
    inner: Arc<SessionInner>,
}

impl HardwareSessionManager {
    pub fn new(
        catalog: Arc<DeviceCatalog>,
        opener: Arc<dyn DeviceOpener>,
        config: InputConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                catalog,
                opener,
                bridge: ArcSwapOption::empty(),
                receiver: ReceiverSlot::new(),
                session: Mutex::new(Session {
                    state: SessionState::Idle,
                    open_device: None,
                    opening: None,
                    reading: false,
                }),
                next_request: AtomicU64::new(0),
                config,
                stats: DispatchStats::default(),
            }),
        }
    }

    // ==================== Native Bridge ====================

    /// Install the native reading loop. Replaces any previous one.
    pub fn set_native_setup_handler(&self, bridge: Arc<dyn NativeBridge>) {
        self.inner.bridge.store(Some(Arc::new(bridge)));
    }

    pub fn is_native_setup_handler_set(&self) -> bool {
        self.inner.bridge.load().is_some()
    }

    pub fn init_native(&self) -> Result<()> {
        self.inner.bridge()?.init()
    }

    /// Handle for the bridge to deliver messages through. Does not keep the
    /// session alive.
    pub fn sink(&self) -> NativeSink {
        NativeSink {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ==================== Devices ====================

    pub fn catalog(&self) -> &Arc<DeviceCatalog> {
        &self.inner.catalog
    }

    /// Rescan the host devices.
    pub fn scan(&self, discovery: &dyn DeviceDiscovery) -> Vec<DeviceDescriptor> {
        let devices = self.inner.catalog.scan(discovery);
        let mut session = self.inner.session.lock();
        if session.state == SessionState::Idle {
            session.state = SessionState::Catalogued;
        }
        devices
    }

    /// Host reported devices attached or detached.
    ///
    /// Rescans; releases the open device if it disappeared and cancels an
    /// open request for a device that vanished. With `auto_open_first`, opens
    /// the first device when nothing is open.
    pub fn on_device_list_changed(
        &self,
        discovery: &dyn DeviceDiscovery,
    ) -> Result<Option<PendingOpen>> {
        let devices = self.scan(discovery);

        let (detached, busy) = {
            let mut session = self.inner.session.lock();
            let vanished = session
                .opening
                .as_ref()
                .filter(|(_, d)| !devices.iter().any(|known| known.id == d.id))
                .map(|(_, d)| d.name.clone());
            if let Some(name) = vanished {
                session.opening = None;
                if session.state == SessionState::Opening {
                    session.state = SessionState::Idle;
                }
                warn!("MIDI device '{}' detached while opening", name);
            }

            let detached = session
                .open_device
                .as_ref()
                .filter(|open| !devices.iter().any(|d| d.id == open.id()))
                .map(|open| (open.name().to_string(), session.reading));
            (detached, session.busy_with().is_some())
        };

        if let Some((name, reading)) = detached {
            warn!("MIDI device '{}' detached", name);
            let stopped = if reading { self.stop_reading() } else { Ok(()) };
            self.close();
            if let Err(e) = stopped {
                warn!("Stopping detached MIDI device '{}' failed: {}", name, e);
                return Err(e);
            }
        } else if busy {
            return Ok(None);
        }

        if !self.inner.config.auto_open_first {
            return Ok(None);
        }
        match devices.first() {
            Some(first) => self.select_and_open(first).map(Some),
            None => Ok(None),
        }
    }

    // ==================== Session ====================

    /// Ask the host to open `descriptor`; reading starts when it completes.
    ///
    /// Fails fast without a native bridge. Another open or opening device is
    /// handled per [`OpenPolicy`].
    pub fn select_and_open(&self, descriptor: &DeviceDescriptor) -> Result<PendingOpen> {
        if !self.is_native_setup_handler_set() {
            return Err(Error::BridgeNotInstalled);
        }

        let request = self.inner.next_request.fetch_add(1, Ordering::Relaxed) + 1;
        let stop_previous = {
            let mut session = self.inner.session.lock();
            let mut stop_previous = false;
            if let Some(open) = session.busy_with().map(str::to_string) {
                match self.inner.config.open_policy {
                    OpenPolicy::Reject => {
                        return Err(Error::SessionBusy {
                            open,
                            requested: descriptor.name.clone(),
                        });
                    }
                    OpenPolicy::Replace => {
                        debug!("Replacing '{}' with '{}'", open, descriptor.name);
                        session.open_device = None;
                        stop_previous = session.reading;
                    }
                }
            }
            session.opening = Some((request, descriptor.clone()));
            session.state = SessionState::Opening;
            stop_previous
        };

        if stop_previous {
            if let Err(e) = self.inner.bridge().and_then(|b| b.stop_reading()) {
                warn!("Stopping previous MIDI device failed: {}", e);
            }
            self.inner.session.lock().reading = false;
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let completion =
            OpenCompletion::new(request, descriptor.clone(), Arc::downgrade(&self.inner), tx);
        debug!("Opening MIDI device '{}'", descriptor.name);
        self.inner.opener.open_device(descriptor, completion);

        Ok(PendingOpen::new(descriptor.clone(), rx))
    }

    /// Release the local device handle and cancel an outstanding open.
    ///
    /// Does not stop the native loop; call [`stop_reading`](Self::stop_reading)
    /// for that.
    pub fn close(&self) {
        let mut session = self.inner.session.lock();
        if let Some(device) = session.open_device.take() {
            debug!("Closed MIDI device '{}'", device.name());
        }
        if session.opening.take().is_some() || session.state == SessionState::Reading {
            session.state = SessionState::Idle;
        }
    }

    pub fn start_reading(&self, device: &DeviceHandle, port: usize) -> Result<()> {
        self.inner.start_reading(device, port)
    }

    pub fn stop_reading(&self) -> Result<()> {
        self.inner.stop_reading()
    }

    /// Stop reading (if running) and close.
    pub fn shutdown(&self) -> Result<()> {
        let reading = self.inner.session.lock().reading;
        let stopped = if reading { self.stop_reading() } else { Ok(()) };
        self.close();
        stopped
    }

    pub fn state(&self) -> SessionState {
        self.inner.session.lock().state
    }

    pub fn open_device(&self) -> Option<DeviceHandle> {
        self.inner.session.lock().open_device.clone()
    }

    /// Device of the outstanding open request, if any.
    pub fn opening_device(&self) -> Option<DeviceDescriptor> {
        self.inner
            .session
            .lock()
            .opening
            .as_ref()
            .map(|(_, d)| d.clone())
    }

    pub fn is_reading(&self) -> bool {
        self.inner.session.lock().reading
    }

    pub fn port_number(&self) -> usize {
        self.inner.config.port_number
    }

    // ==================== Dispatch ====================

    pub fn set_receiver(&self, receiver: Arc<dyn MessageReceiver>) {
        self.inner.receiver.set(receiver);
    }

    pub fn clear_receiver(&self) {
        self.inner.receiver.clear();
    }

    pub fn has_receiver(&self) -> bool {
        self.inner.receiver.is_set()
    }

    /// One complete message from the native loop. Dropped silently when no
    /// receiver is set.
    pub fn on_native_message(&self, bytes: &[u8]) {
        self.inner.on_native_message(bytes);
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.inner.stats.snapshot()
    }
}

impl std::fmt::Debug for HardwareSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HardwareSessionManager")
            .field("session", &*self.inner.session.lock())
            .field("receiver", &self.inner.receiver)
            .finish()
    }
}

/// Weak delivery handle handed to the native bridge.
#[derive(Clone, Debug)]
pub struct NativeSink {
    inner: Weak<SessionInner>,
}

impl NativeSink {
    /// Returns `false` once the session is gone.
    pub fn deliver(&self, bytes: &[u8]) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.on_native_message(bytes);
                true
            }
            None => false,
        }
    }

    /// Transport-style delivery. The timestamp is informational only.
    pub fn deliver_range(
        &self,
        bytes: &[u8],
        offset: usize,
        count: usize,
        _timestamp_nanos: i64,
    ) -> bool {
        match offset.checked_add(count).and_then(|end| bytes.get(offset..end)) {
            Some(message) => self.deliver(message),
            None => {
                debug!(
                    "Native message range {}+{} outside {} bytes",
                    offset,
                    count,
                    bytes.len()
                );
                self.inner.strong_count() > 0
            }
        }
    }
}
