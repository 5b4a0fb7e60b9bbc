//! Asynchronous device opening as a message-passing boundary.
//!
//! The host opens devices on its own thread and reports back through an
//! [`OpenCompletion`]. The caller of `select_and_open` observes the result
//! through the matching [`PendingOpen`]. Both success and rejection travel the
//! same channel, so an open request never stays unresolved.

use crate::device::{DeviceDescriptor, DeviceHandle};
use crate::error::{Error, Result};
use crate::session::SessionInner;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Weak;
use std::time::Duration;

/// Host device-opening API.
pub trait DeviceOpener: Send + Sync {
    /// Start opening `descriptor`. Exactly one of
    /// [`OpenCompletion::opened`] / [`OpenCompletion::rejected`] is expected,
    /// from any thread, possibly before this call returns. Dropping the
    /// completion unused counts as a rejection.
    fn open_device(&self, descriptor: &DeviceDescriptor, completion: OpenCompletion);
}

/// One-shot completion handle for an open request.
pub struct OpenCompletion {
    request: u64,
    descriptor: DeviceDescriptor,
    session: Weak<SessionInner>,
    outcome: Sender<Result<DeviceHandle>>,
    done: bool,
}

impl OpenCompletion {
    pub(crate) fn new(
        request: u64,
        descriptor: DeviceDescriptor,
        session: Weak<SessionInner>,
        outcome: Sender<Result<DeviceHandle>>,
    ) -> Self {
        Self {
            request,
            descriptor,
            session,
            outcome,
            done: false,
        }
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// The host opened the device.
    pub fn opened(mut self, device: DeviceHandle) {
        self.finish(Ok(device));
    }

    /// The host refused to open the device.
    pub fn rejected(mut self, reason: impl Into<String>) {
        let err = Error::OpenRejected {
            device: self.descriptor.name.clone(),
            reason: reason.into(),
        };
        self.finish(Err(err));
    }

    fn finish(&mut self, outcome: Result<DeviceHandle>) {
        self.done = true;
        let outcome = match self.session.upgrade() {
            Some(session) => session.complete_open(self.request, &self.descriptor.name, outcome),
            None => Err(Error::OpenRejected {
                device: self.descriptor.name.clone(),
                reason: "session shut down".to_string(),
            }),
        };
        // The caller may have dropped its PendingOpen; nobody to tell then.
        let _ = self.outcome.send(outcome);
    }
}

impl Drop for OpenCompletion {
    fn drop(&mut self) {
        if !self.done {
            let err = Error::OpenRejected {
                device: self.descriptor.name.clone(),
                reason: "open request dropped by host".to_string(),
            };
            self.finish(Err(err));
        }
    }
}

impl std::fmt::Debug for OpenCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCompletion")
            .field("request", &self.request)
            .field("device", &self.descriptor.name)
            .finish()
    }
}

/// Caller-side view of an open request.
#[derive(Debug)]
pub struct PendingOpen {
    descriptor: DeviceDescriptor,
    outcome: Receiver<Result<DeviceHandle>>,
    resolved: Option<Result<DeviceHandle>>,
}

impl PendingOpen {
    pub(crate) fn new(
        descriptor: DeviceDescriptor,
        outcome: Receiver<Result<DeviceHandle>>,
    ) -> Self {
        Self {
            descriptor,
            outcome,
            resolved: None,
        }
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Non-blocking. `None` while the host has not answered yet.
    pub fn try_outcome(&mut self) -> Option<&Result<DeviceHandle>> {
        if self.resolved.is_none() {
            match self.outcome.try_recv() {
                Ok(outcome) => self.resolved = Some(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.resolved = Some(Err(self.lost())),
            }
        }
        self.resolved.as_ref()
    }

    pub fn is_resolved(&mut self) -> bool {
        self.try_outcome().is_some()
    }

    /// Block until the host answers.
    pub fn wait(mut self) -> Result<DeviceHandle> {
        if let Some(outcome) = self.resolved.take() {
            return outcome;
        }
        self.outcome.recv().unwrap_or_else(|_| Err(self.lost()))
    }

    /// Block for at most `timeout`; [`Error::OpenPending`] when it elapses.
    pub fn wait_timeout(mut self, timeout: Duration) -> Result<DeviceHandle> {
        if let Some(outcome) = self.resolved.take() {
            return outcome;
        }
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(Error::OpenPending(self.descriptor.name.clone())),
            Err(RecvTimeoutError::Disconnected) => Err(self.lost()),
        }
    }

    fn lost(&self) -> Error {
        Error::OpenRejected {
            device: self.descriptor.name.clone(),
            reason: "completion lost".to_string(),
        }
    }
}
