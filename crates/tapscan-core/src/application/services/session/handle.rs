//! Cloneable front door of a running session.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use super::event::{CloseReason, SessionEvent};
use crate::application::ApplicationError;
use crate::domain::{
    Device, DeviceId, DeviceList, ExclusiveAccessStatus, Orientation, ScanReport, SessionSnapshot,
    Size, TapEvent,
};
use crate::error::TapscanResult;

/// Sends events to the session actor and reads its published state.
///
/// Every method returns immediately; the actor handles events strictly in
/// the order they were sent. Use [`SessionHandle::flush`] to wait until
/// everything sent so far has been handled.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
    devices: Arc<Mutex<DeviceList>>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<SessionEvent>,
        devices: Arc<Mutex<DeviceList>>,
        snapshot: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self {
            tx,
            devices,
            snapshot,
        }
    }

    fn send(&self, event: SessionEvent) -> TapscanResult<()> {
        self.tx
            .send(event)
            .map_err(|_| ApplicationError::SessionClosed.into())
    }

    fn devices(&self) -> TapscanResult<MutexGuard<'_, DeviceList>> {
        self.devices
            .lock()
            .map_err(|_| ApplicationError::DeviceListLock.into())
    }

    // ── device list ─────────────────────────────────────────────────────

    /// Register a newly attached scanner.
    ///
    /// The first device ever added to an empty list is selected automatically.
    /// Duplicates are ignored.
    pub fn device_added(&self, device: Device) -> TapscanResult<()> {
        let id = device.id.clone();
        let first = {
            let mut list = self.devices()?;
            if !list.add(device) {
                debug!(device = %id, "Device already listed");
                return Ok(());
            }
            list.len() == 1
        };
        self.send(SessionEvent::DeviceAdded { id, first })
    }

    /// Forget a detached scanner. Unknown ids are ignored.
    pub fn device_removed(&self, id: &DeviceId) -> TapscanResult<()> {
        let former_index = self.devices()?.remove(id);
        match former_index {
            Some(former_index) => self.send(SessionEvent::DeviceRemoved {
                id: id.clone(),
                former_index,
            }),
            None => {
                debug!(device = %id, "Removed device was not listed");
                Ok(())
            }
        }
    }

    pub fn device_updated(&self, id: &DeviceId) -> TapscanResult<()> {
        self.send(SessionEvent::DeviceUpdated(id.clone()))
    }

    /// Current device list, in insertion order.
    pub fn device_list(&self) -> TapscanResult<Vec<Device>> {
        Ok(self.devices()?.iter().cloned().collect())
    }

    /// Switch to the next device in the list (wraps around).
    pub fn cycle_device(&self) -> TapscanResult<()> {
        self.send(SessionEvent::CycleDevice)
    }

    /// Acquire the selected device again. Does nothing when nothing is selected.
    pub fn select_current(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Reselect)
    }

    // ── lifecycle ───────────────────────────────────────────────────────

    /// Release the scanner and camera. The selection is kept for a later resume.
    pub fn stop(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Close(CloseReason::Stop))
    }

    pub fn entered_background(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Close(CloseReason::Background))
    }

    pub fn leaving_background(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Reselect)
    }

    pub fn suspending(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Close(CloseReason::Suspend))
    }

    pub fn resuming(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Reselect)
    }

    /// Release everything and end the actor task.
    pub fn shutdown(&self) -> TapscanResult<()> {
        self.send(SessionEvent::Close(CloseReason::Shutdown))
    }

    // ── preview ─────────────────────────────────────────────────────────

    pub fn tap(&self, tap: TapEvent) -> TapscanResult<()> {
        self.send(SessionEvent::Tap(tap))
    }

    pub fn orientation_changed(&self, orientation: Orientation) -> TapscanResult<()> {
        self.send(SessionEvent::OrientationChanged(orientation))
    }

    pub fn window_resized(&self, size: Size) -> TapscanResult<()> {
        self.send(SessionEvent::WindowResized(size))
    }

    pub fn capture_failed(&self, reason: impl Into<String>) -> TapscanResult<()> {
        self.send(SessionEvent::CaptureFailed(reason.into()))
    }

    pub fn exclusive_access_changed(&self, status: ExclusiveAccessStatus) -> TapscanResult<()> {
        self.send(SessionEvent::ExclusiveAccessChanged(status))
    }

    // ── scanner notifications ───────────────────────────────────────────

    pub fn scan_received(&self, device: &DeviceId, report: ScanReport) -> TapscanResult<()> {
        self.send(SessionEvent::ScanReceived {
            device: device.clone(),
            report,
        })
    }

    /// The platform revoked the claim on a scanner.
    pub fn scanner_closed(&self, device: &DeviceId) -> TapscanResult<()> {
        self.send(SessionEvent::ScannerClosed(device.clone()))
    }

    // ── observation ─────────────────────────────────────────────────────

    /// Wait until every event sent before this call has been handled.
    pub async fn flush(&self) -> TapscanResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionEvent::Flush(tx))?;
        rx.await.map_err(|_| ApplicationError::SessionClosed.into())
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that wakes on every published transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }
}
