//! Simulated scanner platform.
//!
//! A deterministic stand-in for the OS scanner and capture stack. Every port
//! call is recorded as an [`Activity`] so tests and the CLI can show exactly
//! what the session did, and claims are counted so overlapping ownership is
//! detectable.

mod camera;
mod gate;
mod scanner;

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockWriteGuard},
};

use serde::Serialize;
use tracing::debug;

use tapscan_core::{
    application::{ApplicationError, Platform, PortResult},
    domain::{
        Device, DeviceId, EnclosureLocation, FocusMode, FocusRange, FocusState, Rect, Size,
        StabilizationMode,
    },
};

pub use camera::SimulatedCamera;
pub use gate::SelectionGate;
pub use scanner::{SimulatedClaim, SimulatedScanner};

use gate::Gate;

/// What a simulated device looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub device: Device,
    /// Capture device behind a camera scanner. `None` for handheld scanners.
    pub video_device: Option<String>,
    pub stream: Size,
    pub claimable: bool,
    pub focus: bool,
    pub white_balance: bool,
    pub stabilization: bool,
}

impl DeviceSpec {
    /// Handheld scanner without a camera.
    pub fn scanner(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            device: Device::new(id, name, EnclosureLocation::External),
            video_device: None,
            stream: Size::default(),
            claimable: true,
            focus: false,
            white_balance: false,
            stabilization: false,
        }
    }

    /// Camera-based scanner with focus and image controls.
    pub fn camera(
        id: DeviceId,
        name: impl Into<String>,
        location: EnclosureLocation,
        video_device: impl Into<String>,
    ) -> Self {
        Self {
            device: Device::new(id, name, location),
            video_device: Some(video_device.into()),
            stream: Size::new(640.0, 480.0),
            claimable: true,
            focus: true,
            white_balance: true,
            stabilization: true,
        }
    }

    pub fn unclaimable(mut self) -> Self {
        self.claimable = false;
        self
    }

    pub fn with_stream(mut self, stream: Size) -> Self {
        self.stream = stream;
        self
    }

    pub fn without_focus(mut self) -> Self {
        self.focus = false;
        self
    }

    pub fn id(&self) -> &DeviceId {
        &self.device.id
    }
}

/// One recorded port call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Activity {
    Resolved { device: DeviceId },
    ResolveFailed { device: DeviceId },
    Claimed { device: DeviceId },
    ClaimRefused { device: DeviceId },
    Enabled { device: DeviceId },
    TriggerStarted { device: DeviceId },
    TriggerStopped { device: DeviceId },
    Released { device: DeviceId },
    CameraOpened { video: String },
    CameraDenied { video: String },
    PreviewStarted { video: String },
    PreviewBlocked { video: String },
    PreviewStopped { video: String },
    CameraClosed { video: String },
    Rotation { degrees: i32 },
    FocusLocked,
    FocusUnlocked,
    FocusConfigured {
        mode: Option<FocusMode>,
        range: Option<FocusRange>,
    },
    FocusRegion { bounds: Rect },
    RegionsCleared,
    Focused,
    WhiteBalanceAuto,
    Stabilization { mode: StabilizationMode },
    DisplayActive,
    DisplayReleased,
}

#[derive(Default)]
struct PlatformInner {
    devices: HashMap<DeviceId, DeviceSpec>,
    claimed: Vec<DeviceId>,
    max_concurrent_claims: usize,
    camera_denied: bool,
    exclusive_holder: bool,
    focus_state: FocusState,
    display_requests: i64,
    gates: HashMap<DeviceId, Arc<Gate>>,
    activity: Vec<Activity>,
}

/// Thread-safe simulated platform. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct SimulatedPlatform {
    inner: Arc<RwLock<PlatformInner>>,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(specs: impl IntoIterator<Item = DeviceSpec>) -> Self {
        let platform = Self::new();
        for spec in specs {
            platform.add_device(spec);
        }
        platform
    }

    /// Port bundle for the session service.
    pub fn platform(&self) -> Platform {
        Platform::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }

    fn lock(&self) -> PortResult<RwLockWriteGuard<'_, PlatformInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::port("simulated platform", "state lock poisoned"))
    }

    /// Run `f` against the shared state. A poisoned lock yields `None`.
    fn with<R>(&self, f: impl FnOnce(&mut PlatformInner) -> R) -> Option<R> {
        self.lock().ok().map(|mut inner| f(&mut inner))
    }

    fn record(&self, activity: Activity) {
        debug!(?activity, "Simulated platform call");
        self.with(|inner| inner.activity.push(activity));
    }

    // ── device catalogue ────────────────────────────────────────────────

    pub fn add_device(&self, spec: DeviceSpec) {
        self.with(|inner| inner.devices.insert(spec.id().clone(), spec));
    }

    pub fn remove_device(&self, id: &DeviceId) -> Option<DeviceSpec> {
        self.with(|inner| inner.devices.remove(id)).flatten()
    }

    pub fn spec(&self, id: &DeviceId) -> Option<DeviceSpec> {
        self.with(|inner| inner.devices.get(id).cloned()).flatten()
    }

    fn spec_for_video(&self, video: &str) -> Option<DeviceSpec> {
        self.with(|inner| {
            inner
                .devices
                .values()
                .find(|s| s.video_device.as_deref() == Some(video))
                .cloned()
        })
        .flatten()
    }

    // ── knobs ───────────────────────────────────────────────────────────

    /// Refuse (or allow again) opening capture devices.
    pub fn deny_camera_access(&self, denied: bool) {
        self.with(|inner| inner.camera_denied = denied);
    }

    /// Pretend another application holds the camera exclusively.
    pub fn set_exclusive_holder(&self, held: bool) {
        self.with(|inner| inner.exclusive_holder = held);
    }

    pub fn set_focus_state(&self, state: FocusState) {
        self.with(|inner| inner.focus_state = state);
    }

    /// Pause the next resolution of `id` until the returned gate is released.
    pub fn hold(&self, id: DeviceId) -> SelectionGate {
        let gate = Arc::new(Gate::default());
        self.with(|inner| inner.gates.insert(id, Arc::clone(&gate)));
        SelectionGate::new(gate)
    }

    fn take_gate(&self, id: &DeviceId) -> Option<Arc<Gate>> {
        self.with(|inner| inner.gates.remove(id)).flatten()
    }

    // ── observation ─────────────────────────────────────────────────────

    pub fn activity(&self) -> Vec<Activity> {
        self.inner
            .read()
            .map(|inner| inner.activity.clone())
            .unwrap_or_default()
    }

    /// Highest number of scanners claimed at the same time.
    pub fn max_concurrent_claims(&self) -> usize {
        self.inner
            .read()
            .map(|inner| inner.max_concurrent_claims)
            .unwrap_or_default()
    }

    pub fn claimed(&self) -> Vec<DeviceId> {
        self.inner
            .read()
            .map(|inner| inner.claimed.clone())
            .unwrap_or_default()
    }

    /// Outstanding display keep-awake requests.
    pub fn display_requests(&self) -> i64 {
        self.inner
            .read()
            .map(|inner| inner.display_requests)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for SimulatedPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedPlatform")
            .field("claimed", &self.claimed())
            .field("display_requests", &self.display_requests())
            .finish_non_exhaustive()
    }
}

impl tapscan_core::application::DisplayRequest for SimulatedPlatform {
    fn request_active(&self) {
        self.with(|inner| inner.display_requests += 1);
        self.record(Activity::DisplayActive);
    }

    fn request_release(&self) {
        self.with(|inner| inner.display_requests -= 1);
        self.record(Activity::DisplayReleased);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapscan_core::application::DisplayRequest;

    fn device_id(s: &str) -> DeviceId {
        s.parse().unwrap()
    }

    #[test]
    fn specs_are_stored_by_id() {
        let platform = SimulatedPlatform::with_devices([
            DeviceSpec::scanner(device_id("usb-1"), "Handheld"),
            DeviceSpec::camera(device_id("cam-1"), "Rear", EnclosureLocation::Back, "video0"),
        ]);
        assert!(platform.spec(&device_id("usb-1")).is_some());
        assert_eq!(
            platform.spec_for_video("video0").map(|s| s.device.id),
            Some(device_id("cam-1"))
        );
        assert!(platform.remove_device(&device_id("usb-1")).is_some());
        assert!(platform.spec(&device_id("usb-1")).is_none());
    }

    #[test]
    fn activity_is_tagged_by_kind() {
        let claimed = serde_json::to_value(Activity::Claimed {
            device: device_id("usb-1"),
        })
        .unwrap();
        assert_eq!(claimed, serde_json::json!({ "kind": "claimed", "device": "usb-1" }));

        let rotation = serde_json::to_value(Activity::Rotation { degrees: 270 }).unwrap();
        assert_eq!(rotation["kind"], "rotation");
        assert_eq!(rotation["degrees"], 270);
    }

    #[test]
    fn display_requests_are_balanced() {
        let platform = SimulatedPlatform::new();
        platform.request_active();
        assert_eq!(platform.display_requests(), 1);
        platform.request_release();
        assert_eq!(platform.display_requests(), 0);
        assert_eq!(
            platform.activity(),
            vec![Activity::DisplayActive, Activity::DisplayReleased]
        );
    }
}
