//! Session values: phase, observable snapshot, configuration and the
//! single-slot pending request queue.

use serde::{Deserialize, Serialize};

use crate::domain::entities::device::DeviceId;
use crate::domain::entities::focus::FocusRegion;
use crate::domain::error::DomainError;
use crate::domain::geometry::DEFAULT_FOCUS_RATIO;
use crate::domain::rotation::CameraPlacement;
use crate::domain::value_objects::Orientation;

/// Lifecycle phase of the scanner session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Nothing claimed.
    #[default]
    Idle,
    /// Releasing old resources and acquiring a device.
    Selecting,
    /// A scanner is claimed.
    Active,
    /// Releasing everything.
    Closing,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::Active => "active",
            Self::Closing => "closing",
        })
    }
}

/// A decoded barcode delivered by the claimed scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub symbology: String,
    pub label: String,
}

/// Everything an observer may want to know about the session.
///
/// Published through a `watch` channel after every transition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Device the user picked (survives background/resume).
    pub selected_device: Option<DeviceId>,
    /// Device currently claimed.
    pub active_device: Option<DeviceId>,
    pub device_count: usize,

    pub scanner_claimed: bool,
    pub scanner_supports_preview: bool,
    pub software_trigger_started: bool,
    pub previewing: bool,
    /// Preview start hit an exclusive-access conflict and waits for release.
    pub awaiting_exclusive_access: bool,

    pub orientation: Orientation,
    pub camera: Option<CameraPlacement>,
    pub focus: FocusRegion,
    pub auto_focus: bool,

    pub last_scan: Option<ScanReport>,
    pub scan_count: u64,
}

impl SessionSnapshot {
    /// No scanner claimed, no preview running.
    pub fn is_fully_closed(&self) -> bool {
        !self.scanner_claimed
            && !self.previewing
            && !self.software_trigger_started
            && self.active_device.is_none()
    }
}

/// Tunables for the session service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Focus region edge as a fraction of the shorter control edge.
    pub focus_region_ratio: f64,
    /// Set the white-balance preset to auto when the camera supports it.
    pub apply_white_balance: bool,
    /// Turn optical stabilization to auto when the camera supports it.
    pub apply_stabilization: bool,
    /// Orientation assumed until the first orientation-changed event.
    pub initial_orientation: Orientation,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focus_region_ratio: DEFAULT_FOCUS_RATIO,
            apply_white_balance: true,
            apply_stabilization: true,
            initial_orientation: Orientation::Landscape,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        let ratio = self.focus_region_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(DomainError::InvalidFocusRatio { ratio });
        }
        Ok(())
    }
}

/// What to do once an in-flight selection finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AfterSelection {
    /// A stop arrived: close everything. `shutdown` ends the session too.
    Close { shutdown: bool },
    /// Another device was requested meanwhile.
    Select(DeviceId),
    /// Nothing pending.
    Settle,
}

/// Requests that arrived while a selection was in flight.
///
/// At most one selection is kept: a newer request overwrites the slot. A stop
/// clears the slot and wins over anything requested afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequests {
    next: Option<DeviceId>,
    close_after_current: bool,
    shutdown: bool,
}

impl PendingRequests {
    pub fn request_selection(&mut self, id: DeviceId) {
        self.next = Some(id);
    }

    pub fn request_stop(&mut self, shutdown: bool) {
        self.next = None;
        self.close_after_current = true;
        self.shutdown |= shutdown;
    }

    pub fn is_stop_pending(&self) -> bool {
        self.close_after_current
    }

    pub fn pending_selection(&self) -> Option<&DeviceId> {
        self.next.as_ref()
    }

    /// Consume the pending state. Stop takes precedence over selection.
    pub fn resolve(&mut self) -> AfterSelection {
        if self.close_after_current {
            let shutdown = self.shutdown;
            *self = Self::default();
            return AfterSelection::Close { shutdown };
        }
        match self.next.take() {
            Some(id) => AfterSelection::Select(id),
            None => AfterSelection::Settle,
        }
    }
}
