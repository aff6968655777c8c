//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits describe the platform the session drives: barcode scanner
//! enumeration and claiming, the capture device behind a camera scanner and
//! the display keep-awake request. The `tapscan-adapters` crate provides a
//! simulated implementation.
//!
//! Failures are reported as `None` or `Err` and never panic. The session
//! treats every failure as "feature unavailable" and keeps going.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use crate::application::ApplicationError;
use crate::domain::{
    DeviceId, EnclosureLocation, FocusCapabilities, FocusSettings, FocusState, RegionOfInterest,
    Size, StabilizationMode,
};

/// Result of a port call.
pub type PortResult<T> = Result<T, ApplicationError>;

/// Resolves device identifiers into scanner objects.
///
/// Implemented by:
/// - `tapscan_adapters::simulated::SimulatedPlatform`
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScannerProvider: Send + Sync {
    /// `None` when the device is gone or cannot be opened.
    async fn from_id(&self, id: &DeviceId) -> Option<Box<dyn BarcodeScanner>>;
}

/// An unclaimed barcode scanner.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BarcodeScanner: Send + Sync {
    fn device_id(&self) -> DeviceId;

    /// Identifier of the video capture device behind a camera scanner.
    ///
    /// `None` or an empty string means the scanner has no preview.
    fn video_device_id(&self) -> Option<String>;

    /// Claim exclusive use. `None` when another client holds the claim.
    async fn claim(&self) -> Option<Box<dyn ClaimedScanner>>;
}

/// A scanner this process holds the claim on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClaimedScanner: Send + Sync {
    /// Enable decoding. A claimed scanner that fails here is unusable.
    async fn enable(&self) -> PortResult<()>;

    async fn start_software_trigger(&self) -> PortResult<()>;

    async fn stop_software_trigger(&self) -> PortResult<()>;

    /// Give the claim back. Called exactly once per successful claim.
    async fn release(&self);
}

/// How the capture device is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub video_device_id: String,
    /// Always video-only streaming.
    pub video_only: bool,
    /// Always exclusive control.
    pub exclusive_control: bool,
}

impl CaptureSettings {
    pub fn exclusive_video(video_device_id: impl Into<String>) -> Self {
        Self {
            video_device_id: video_device_id.into(),
            video_only: true,
            exclusive_control: true,
        }
    }
}

/// Opens capture devices.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// Physical placement of the device, if the platform knows it.
    async fn camera_location(&self, video_device_id: &str) -> Option<EnclosureLocation>;

    /// Open the device. `PermissionDenied` when the user refused access.
    async fn open(&self, settings: &CaptureSettings) -> PortResult<Box<dyn Camera>>;
}

/// An open capture device.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Camera: Send + Sync {
    /// `ExclusiveAccessConflict` when another client holds the device.
    async fn start_preview(&self) -> PortResult<()>;

    async fn stop_preview(&self) -> PortResult<()>;

    /// Resolution of the preview stream, once it is known.
    fn preview_resolution(&self) -> Option<Size>;

    /// Attach metadata to the preview stream.
    async fn set_stream_property(&self, key: Uuid, value: i32) -> PortResult<()>;

    // ── focus ───────────────────────────────────────────────────────────

    fn focus_capabilities(&self) -> FocusCapabilities;

    fn focus_state(&self) -> FocusState;

    async fn lock_focus(&self) -> PortResult<()>;

    async fn unlock_focus(&self) -> PortResult<()>;

    fn configure_focus(&self, settings: FocusSettings) -> PortResult<()>;

    async fn focus(&self) -> PortResult<()>;

    async fn set_region_of_interest(&self, region: RegionOfInterest) -> PortResult<()>;

    async fn clear_regions(&self) -> PortResult<()>;

    // ── image controls ──────────────────────────────────────────────────

    fn white_balance_supported(&self) -> bool;

    async fn set_white_balance_auto(&self) -> PortResult<()>;

    fn stabilization_modes(&self) -> Vec<StabilizationMode>;

    fn set_stabilization(&self, mode: StabilizationMode) -> PortResult<()>;

    /// Dispose the device. Preview must already be stopped.
    async fn close(&self);
}

/// Keeps the display on while the preview is visible.
#[cfg_attr(test, automock)]
pub trait DisplayRequest: Send + Sync {
    fn request_active(&self);

    fn request_release(&self);
}

/// Everything the session talks to.
#[derive(Clone)]
pub struct Platform {
    pub scanners: Arc<dyn ScannerProvider>,
    pub cameras: Arc<dyn CameraProvider>,
    pub display: Arc<dyn DisplayRequest>,
}

impl Platform {
    pub fn new(
        scanners: Arc<dyn ScannerProvider>,
        cameras: Arc<dyn CameraProvider>,
        display: Arc<dyn DisplayRequest>,
    ) -> Self {
        Self {
            scanners,
            cameras,
            display,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
