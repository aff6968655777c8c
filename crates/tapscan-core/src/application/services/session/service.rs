//! The session actor: owns every scanner and camera resource.
//!
//! Events are handled one at a time. While a selection awaits port calls the
//! inbox is drained between steps: selection requests collapse into a single
//! pending slot, stop requests are deferred until the selection finishes and
//! everything else waits in a backlog.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::event::{CloseReason, SessionEvent};
use super::handle::SessionHandle;
use crate::application::ports::{BarcodeScanner, Camera, ClaimedScanner, Platform};
use crate::domain::{
    AfterSelection, CameraPlacement, DeviceId, DeviceList, ExclusiveAccessStatus, FocusRegion,
    Orientation, PendingRequests, ScanReport, SessionConfig, SessionPhase, SessionSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Shutdown,
}

/// Resources and flags owned by the actor.
#[derive(Default)]
pub(super) struct SessionState {
    pub(super) phase: SessionPhase,
    pub(super) selected: Option<DeviceId>,
    pub(super) active: Option<DeviceId>,

    pub(super) scanner: Option<Box<dyn BarcodeScanner>>,
    pub(super) claimed: Option<Box<dyn ClaimedScanner>>,
    pub(super) camera: Option<Box<dyn Camera>>,
    pub(super) display_active: bool,

    pub(super) supports_preview: bool,
    pub(super) trigger_started: bool,
    pub(super) previewing: bool,
    pub(super) awaiting_exclusive_access: bool,

    pub(super) orientation: Orientation,
    pub(super) placement: Option<CameraPlacement>,
    pub(super) focus: FocusRegion,
    pub(super) auto_focus: bool,

    pub(super) last_scan: Option<ScanReport>,
    pub(super) scan_count: u64,
}

/// Scanner session service.
///
/// Build one with [`SessionService::new`], keep the returned handle, and
/// drive the service with [`SessionService::run`] (or use [`spawn`]).
pub struct SessionService {
    pub(super) platform: Platform,
    pub(super) config: SessionConfig,
    devices: Arc<Mutex<DeviceList>>,
    inbox: mpsc::UnboundedReceiver<SessionEvent>,
    backlog: VecDeque<SessionEvent>,
    pending: PendingRequests,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    pub(super) state: SessionState,
}

/// Start a session on the current tokio runtime.
pub fn spawn(platform: Platform, config: SessionConfig) -> (SessionHandle, JoinHandle<()>) {
    let (service, handle) = SessionService::new(platform, config);
    (handle, tokio::spawn(service.run()))
}

impl SessionService {
    /// Create a service and the handle that feeds it.
    pub fn new(platform: Platform, config: SessionConfig) -> (Self, SessionHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let devices = Arc::new(Mutex::new(DeviceList::new()));
        let state = SessionState {
            orientation: config.initial_orientation,
            ..SessionState::default()
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
            orientation: state.orientation,
            ..SessionSnapshot::default()
        });

        let handle = SessionHandle::new(tx, Arc::clone(&devices), snapshot_rx);
        let service = Self {
            platform,
            config,
            devices,
            inbox,
            backlog: VecDeque::new(),
            pending: PendingRequests::default(),
            snapshot_tx,
            state,
        };
        (service, handle)
    }

    /// Handle events until shutdown or until every handle is dropped.
    ///
    /// All resources are released before this returns.
    pub async fn run(mut self) {
        info!("Scanner session started");
        while let Some(event) = self.next_event().await {
            if self.dispatch(event).await == Flow::Shutdown {
                break;
            }
        }
        self.close_resources(CloseReason::Shutdown).await;
        info!(scans = self.state.scan_count, "Scanner session ended");
    }

    async fn next_event(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }
        self.inbox.recv().await
    }

    async fn dispatch(&mut self, event: SessionEvent) -> Flow {
        debug!(event = event.name(), "Handling session event");
        match event {
            SessionEvent::CycleDevice => {
                if let Some(next) = self.next_device() {
                    return self.select(next).await;
                }
                warn!("No scanner devices to select");
            }
            SessionEvent::Reselect => {
                if let Some(id) = self.state.selected.clone() {
                    return self.select(id).await;
                }
                debug!("No device selected, nothing to resume");
            }
            SessionEvent::DeviceAdded { id, first } => {
                info!(device = %id, "Scanner device added");
                if first {
                    return self.select(id).await;
                }
                self.publish();
            }
            SessionEvent::DeviceRemoved { id, former_index } => {
                return self.on_device_removed(id, former_index).await;
            }
            SessionEvent::DeviceUpdated(id) => {
                debug!(device = %id, "Scanner device updated");
            }
            SessionEvent::Close(reason) => {
                self.close_resources(reason).await;
                if reason == CloseReason::Shutdown {
                    return Flow::Shutdown;
                }
            }
            SessionEvent::Tap(tap) => self.on_tap(tap).await,
            SessionEvent::OrientationChanged(orientation) => {
                self.state.orientation = orientation;
                if self.state.previewing {
                    self.apply_rotation().await;
                }
                self.publish();
            }
            SessionEvent::WindowResized(size) => {
                debug!(width = size.width, height = size.height, "Window resized");
            }
            SessionEvent::ScanReceived { device, report } => self.on_scan(device, report),
            SessionEvent::ScannerClosed(id) => {
                if self.state.active.as_ref() == Some(&id) {
                    warn!(device = %id, "Claimed scanner was closed by the platform");
                    self.close_resources(CloseReason::Stop).await;
                }
            }
            SessionEvent::CaptureFailed(reason) => {
                warn!(%reason, "Media capture failed");
            }
            SessionEvent::ExclusiveAccessChanged(status) => self.on_exclusive_access(status).await,
            SessionEvent::Flush(done) => {
                let _ = done.send(());
            }
        }
        Flow::Continue
    }

    // ── selection ───────────────────────────────────────────────────────

    /// Acquire `id`, then whatever was requested while acquiring.
    async fn select(&mut self, id: DeviceId) -> Flow {
        let mut target = id;
        loop {
            self.state.selected = Some(target.clone());
            self.acquire(&target).await;

            match self.pending.resolve() {
                AfterSelection::Settle => {
                    self.finish_selection();
                    return Flow::Continue;
                }
                AfterSelection::Select(next) => {
                    debug!(device = %next, "Switching to device requested during selection");
                    target = next;
                }
                AfterSelection::Close { shutdown } => {
                    let reason = if shutdown {
                        CloseReason::Shutdown
                    } else {
                        CloseReason::Stop
                    };
                    self.close_resources(reason).await;
                    return if shutdown {
                        Flow::Shutdown
                    } else {
                        Flow::Continue
                    };
                }
            }
        }
    }

    /// Release the old device and claim `id`. Failures leave nothing claimed.
    #[instrument(skip_all, fields(device = %id))]
    async fn acquire(&mut self, id: &DeviceId) {
        self.state.phase = SessionPhase::Selecting;
        self.publish();
        self.release_resources().await;
        self.absorb();

        let Some(scanner) = self.platform.scanners.from_id(id).await else {
            warn!("Failed to create a barcode scanner object");
            self.absorb();
            return;
        };
        self.absorb();

        let Some(claimed) = scanner.claim().await else {
            warn!("Failed to claim the barcode scanner");
            self.absorb();
            return;
        };
        self.absorb();

        if let Err(e) = claimed.enable().await {
            warn!(error = %e, "Failed to enable the barcode scanner");
            claimed.release().await;
            self.absorb();
            return;
        }

        let video_device_id = scanner.video_device_id().filter(|v| !v.is_empty());
        self.state.supports_preview = video_device_id.is_some();
        self.state.scanner = Some(scanner);
        self.state.claimed = Some(claimed);
        self.state.active = Some(id.clone());
        info!(preview = self.state.supports_preview, "Scanner claimed");
        self.publish();
        self.absorb();

        if let Some(video_device_id) = video_device_id {
            self.start_preview(video_device_id).await;
            self.absorb();
        }

        self.start_trigger().await;
        self.absorb();
    }

    async fn start_trigger(&mut self) {
        let Some(claimed) = self.state.claimed.as_deref() else {
            return;
        };
        match claimed.start_software_trigger().await {
            Ok(()) => self.state.trigger_started = true,
            Err(e) => warn!(error = %e, "Failed to start the software trigger"),
        }
    }

    fn finish_selection(&mut self) {
        self.state.phase = if self.state.claimed.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Idle
        };
        self.publish();
    }

    /// Pull events that arrived while a selection is in flight.
    fn absorb(&mut self) {
        while let Ok(event) = self.inbox.try_recv() {
            match event {
                SessionEvent::CycleDevice => {
                    if let Some(next) = self.next_device() {
                        self.state.selected = Some(next.clone());
                        self.pending.request_selection(next);
                    }
                }
                SessionEvent::DeviceAdded { id, first: true } => {
                    self.state.selected = Some(id.clone());
                    self.pending.request_selection(id);
                }
                SessionEvent::Reselect => {
                    if let Some(id) = self.state.selected.clone() {
                        self.pending.request_selection(id);
                    }
                }
                SessionEvent::Close(reason) => {
                    debug!(reason = reason.as_str(), "Stop deferred until selection completes");
                    self.pending.request_stop(reason == CloseReason::Shutdown);
                }
                other => self.backlog.push_back(other),
            }
        }
        if self.pending.is_stop_pending() || self.pending.pending_selection().is_some() {
            debug!(
                next = ?self.pending.pending_selection(),
                stop = self.pending.is_stop_pending(),
                backlog = self.backlog.len(),
                "Requests queued behind the current selection"
            );
        }
    }

    /// Device after the selected one, wrapping around.
    fn next_device(&self) -> Option<DeviceId> {
        match self.devices.lock() {
            Ok(list) => list
                .next_after(self.state.selected.as_ref())
                .map(|d| d.id.clone()),
            Err(_) => {
                warn!("Device list lock poisoned");
                None
            }
        }
    }

    async fn on_device_removed(&mut self, id: DeviceId, former_index: usize) -> Flow {
        info!(device = %id, "Scanner device removed");
        if self.state.selected.as_ref() != Some(&id) {
            self.publish();
            return Flow::Continue;
        }

        self.close_resources(CloseReason::Stop).await;
        self.state.selected = None;
        let replacement = match self.devices.lock() {
            Ok(list) => list.replacement_for(former_index).map(|d| d.id.clone()),
            Err(_) => None,
        };
        match replacement {
            Some(next) => {
                info!(device = %next, "Selecting replacement device");
                self.select(next).await
            }
            None => {
                self.publish();
                Flow::Continue
            }
        }
    }

    // ── teardown ────────────────────────────────────────────────────────

    /// Full close: release everything and settle in `Idle`.
    #[instrument(skip_all, fields(reason = reason.as_str()))]
    pub(super) async fn close_resources(&mut self, reason: CloseReason) {
        if self.holds_resources() {
            self.state.phase = SessionPhase::Closing;
            self.publish();
        }
        self.release_resources().await;
        self.state.phase = SessionPhase::Idle;
        self.publish();
    }

    fn holds_resources(&self) -> bool {
        self.state.claimed.is_some() || self.state.camera.is_some() || self.state.display_active
    }

    /// Stop trigger, stop preview, close camera, release claim, release display.
    ///
    /// Each step runs even when an earlier one fails.
    async fn release_resources(&mut self) {
        if self.state.trigger_started {
            if let Some(claimed) = self.state.claimed.as_deref() {
                if let Err(e) = claimed.stop_software_trigger().await {
                    warn!(error = %e, "Failed to stop the software trigger");
                }
            }
        }
        self.state.trigger_started = false;

        self.stop_preview().await;

        if let Some(claimed) = self.state.claimed.take() {
            claimed.release().await;
            debug!("Scanner claim released");
        }
        self.state.scanner = None;
        self.state.active = None;
        self.state.supports_preview = false;

        if self.state.display_active {
            self.platform.display.request_release();
            self.state.display_active = false;
        }
    }

    // ── notifications ───────────────────────────────────────────────────

    fn on_scan(&mut self, device: DeviceId, report: ScanReport) {
        if self.state.active.as_ref() != Some(&device) {
            debug!(device = %device, "Scan from an unclaimed device ignored");
            return;
        }
        info!(symbology = %report.symbology, label = %report.label, "Barcode scanned");
        self.state.last_scan = Some(report);
        self.state.scan_count += 1;
        self.publish();
    }

    async fn on_exclusive_access(&mut self, status: ExclusiveAccessStatus) {
        match status {
            ExclusiveAccessStatus::SharedReadOnlyAvailable => {
                warn!("Another app has exclusive access to the camera");
            }
            ExclusiveAccessStatus::ExclusiveControlAvailable => {
                if self.state.awaiting_exclusive_access
                    && !self.state.previewing
                    && self.state.camera.is_some()
                {
                    info!("Exclusive camera access regained, restarting preview");
                    self.begin_preview().await;
                }
            }
        }
    }

    // ── publishing ──────────────────────────────────────────────────────

    pub(super) fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn snapshot(&self) -> SessionSnapshot {
        let device_count = self.devices.lock().map(|l| l.len()).unwrap_or_default();
        let s = &self.state;
        SessionSnapshot {
            phase: s.phase,
            selected_device: s.selected.clone(),
            active_device: s.active.clone(),
            device_count,
            scanner_claimed: s.claimed.is_some(),
            scanner_supports_preview: s.supports_preview,
            software_trigger_started: s.trigger_started,
            previewing: s.previewing,
            awaiting_exclusive_access: s.awaiting_exclusive_access,
            orientation: s.orientation,
            camera: s.placement,
            focus: s.focus,
            auto_focus: s.auto_focus,
            last_scan: s.last_scan.clone(),
            scan_count: s.scan_count,
        }
    }
}
