//! Scripted sessions against the simulated platform.
//!
//! A scenario file lists simulated devices and a sequence of steps. Replaying
//! it drives a real [`SessionService`](tapscan_core::application::SessionService)
//! and records the published snapshot after every step.
//!
//! # `scenario.toml` format
//!
//! ```toml
//! [[device]]
//! id       = "cam-1"
//! name     = "Rear camera"
//! location = "back"          # front | back | external | unknown
//! video    = "video0"        # omit for handheld scanners
//! stream   = "640x480"
//!
//! [[step]]
//! event  = "add-device"
//! device = "cam-1"
//!
//! [[step]]
//! event   = "tap"
//! at      = "200,150"
//! control = "400x300"
//! ```
//!
//! Steps between `hold` and `release` are sent while the held device's
//! selection is paused, so requests pile up exactly as they would during a
//! slow claim.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use tapscan_core::{
    application::{SessionHandle, spawn},
    domain::{
        DeviceId, DomainError, EnclosureLocation, ExclusiveAccessStatus, FocusState, Orientation,
        Point, PointerKind, ScanReport, SessionConfig, SessionSnapshot, Size, TapEvent,
    },
    error::TapscanError,
};

use crate::simulated::{Activity, DeviceSpec, SelectionGate, SimulatedPlatform};

/// How long `release` waits for the held selection to reach the platform.
const HOLD_TIMEOUT: Duration = Duration::from_secs(5);

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Step {step}: {source}")]
    InvalidValue {
        step: usize,
        #[source]
        source: DomainError,
    },

    #[error("Step {step}: unknown device '{device}'")]
    UnknownDevice { step: usize, device: String },

    #[error("Step {step}: 'release' without a matching 'hold'")]
    NothingHeld { step: usize },

    #[error("Step {step}: the held selection never started")]
    HoldNeverReached { step: usize },

    #[error("Scenario declares device '{0}' twice")]
    DuplicateDevice(String),

    #[error(transparent)]
    Session(#[from] TapscanError),
}

// ── Manifest types ──────────────────────────────────────────────────────────

/// Deserialized `scenario.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceEntry>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// `[[device]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: EnclosureLocation,
    /// Video device id; omitted or empty for scanners without a camera.
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub stream: Option<String>,
    #[serde(default = "yes")]
    pub claimable: bool,
    #[serde(default = "yes")]
    pub focus: bool,
}

fn yes() -> bool {
    true
}

/// `[[step]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Step {
    AddDevice { device: String },
    RemoveDevice { device: String },
    UpdateDevice { device: String },
    Cycle,
    Stop,
    Background,
    Foreground,
    Suspend,
    Resume,
    Tap {
        at: String,
        control: String,
        #[serde(default)]
        pointer: PointerKind,
    },
    Orientation { value: Orientation },
    Resize { size: String },
    Scan {
        device: String,
        #[serde(default = "default_symbology")]
        symbology: String,
        label: String,
    },
    ScannerClosed { device: String },
    CaptureFailed { reason: String },
    /// Another application takes the camera (`held = true`) or gives it back.
    ExclusiveAccess { held: bool },
    CameraPermission { granted: bool },
    FocusState { state: FocusState },
    /// Pause the next selection of `device` until `release`.
    Hold { device: String },
    Release,
}

fn default_symbology() -> String {
    "unknown".into()
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddDevice { .. } => "add-device",
            Self::RemoveDevice { .. } => "remove-device",
            Self::UpdateDevice { .. } => "update-device",
            Self::Cycle => "cycle",
            Self::Stop => "stop",
            Self::Background => "background",
            Self::Foreground => "foreground",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
            Self::Tap { .. } => "tap",
            Self::Orientation { .. } => "orientation",
            Self::Resize { .. } => "resize",
            Self::Scan { .. } => "scan",
            Self::ScannerClosed { .. } => "scanner-closed",
            Self::CaptureFailed { .. } => "capture-failed",
            Self::ExclusiveAccess { .. } => "exclusive-access",
            Self::CameraPermission { .. } => "camera-permission",
            Self::FocusState { .. } => "focus-state",
            Self::Hold { .. } => "hold",
            Self::Release => "release",
        }
    }
}

impl Scenario {
    /// Load and parse a scenario file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::parse(&raw).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            devices = scenario.devices.len(),
            steps = scenario.steps.len(),
            "Scenario loaded"
        );
        Ok(scenario)
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Build the simulated platform described by the `[[device]]` entries.
    pub fn platform(&self) -> Result<SimulatedPlatform, ScenarioError> {
        let platform = SimulatedPlatform::new();
        for entry in &self.devices {
            let spec = entry.to_spec()?;
            if platform.spec(spec.id()).is_some() {
                return Err(ScenarioError::DuplicateDevice(entry.id.clone()));
            }
            platform.add_device(spec);
        }
        Ok(platform)
    }
}

impl DeviceEntry {
    fn to_spec(&self) -> Result<DeviceSpec, ScenarioError> {
        let id = DeviceId::try_new(self.id.clone())
            .map_err(|source| ScenarioError::InvalidValue { step: 0, source })?;
        let name = self.name.clone().unwrap_or_else(|| self.id.clone());

        let mut spec = match self.video.as_deref().filter(|v| !v.is_empty()) {
            Some(video) => DeviceSpec::camera(id, name, self.location, video),
            None => {
                let mut spec = DeviceSpec::scanner(id, name);
                spec.device.location = self.location;
                spec
            }
        };
        if let Some(stream) = &self.stream {
            let stream = stream
                .parse::<Size>()
                .map_err(|source| ScenarioError::InvalidValue { step: 0, source })?;
            spec = spec.with_stream(stream);
        }
        if !self.claimable {
            spec = spec.unclaimable();
        }
        if !self.focus {
            spec = spec.without_focus();
        }
        Ok(spec)
    }
}

// ── Replay ──────────────────────────────────────────────────────────────────

/// Snapshot taken after a step settled.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// 1-based position in the scenario.
    pub index: usize,
    pub event: &'static str,
    pub snapshot: SessionSnapshot,
}

/// Everything observed while replaying a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepRecord>,
    /// State after the final step, before shutdown.
    pub settled: SessionSnapshot,
    /// State after shutdown.
    pub closed: SessionSnapshot,
    pub activity: Vec<Activity>,
    pub max_concurrent_claims: usize,
}

/// Replay `scenario` on a fresh simulated platform.
#[instrument(skip_all, fields(steps = scenario.steps.len()))]
pub async fn replay(
    scenario: &Scenario,
    config: SessionConfig,
) -> Result<ScenarioReport, ScenarioError> {
    let platform = scenario.platform()?;
    let (handle, task) = spawn(platform.platform(), config);
    let mut replayer = Replayer {
        platform: &platform,
        handle: &handle,
        held: None,
        steps: Vec::new(),
    };

    let outcome = replayer.run(&scenario.steps).await;
    // A failed step can leave the actor parked on a held selection.
    if let Some(gate) = replayer.held.take() {
        gate.release();
    }
    let steps = replayer.steps;
    let settled = handle.snapshot();

    // Shut down even when a step failed so no task is left behind.
    let mut updates = handle.subscribe();
    handle.shutdown()?;
    let _ = task.await;
    outcome?;
    let closed = updates.borrow_and_update().clone();

    info!(
        steps = steps.len(),
        scans = settled.scan_count,
        "Scenario replayed"
    );
    Ok(ScenarioReport {
        steps,
        settled,
        closed,
        activity: platform.activity(),
        max_concurrent_claims: platform.max_concurrent_claims(),
    })
}

struct Replayer<'a> {
    platform: &'a SimulatedPlatform,
    handle: &'a SessionHandle,
    held: Option<SelectionGate>,
    steps: Vec<StepRecord>,
}

impl Replayer<'_> {
    async fn run(&mut self, steps: &[Step]) -> Result<(), ScenarioError> {
        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            debug!(index, event = step.name(), "Replaying step");
            self.apply(index, step).await?;

            // While a selection is held, flushing would wait forever.
            if self.held.is_none() {
                self.handle.flush().await?;
                self.steps.push(StepRecord {
                    index,
                    event: step.name(),
                    snapshot: self.handle.snapshot(),
                });
            }
        }
        if let Some(gate) = self.held.take() {
            gate.release();
        }
        self.handle.flush().await?;
        Ok(())
    }

    fn device_id(step: usize, id: &str) -> Result<DeviceId, ScenarioError> {
        DeviceId::try_new(id).map_err(|source| ScenarioError::InvalidValue { step, source })
    }

    /// A device declared in the scenario's `[[device]]` tables.
    fn device(&self, step: usize, id: &str) -> Result<DeviceId, ScenarioError> {
        let id = Self::device_id(step, id)?;
        if self.platform.spec(&id).is_none() {
            return Err(ScenarioError::UnknownDevice {
                step,
                device: id.to_string(),
            });
        }
        Ok(id)
    }

    async fn apply(&mut self, index: usize, step: &Step) -> Result<(), ScenarioError> {
        let invalid = |source| ScenarioError::InvalidValue {
            step: index,
            source,
        };
        let handle = self.handle;

        match step {
            Step::AddDevice { device } => {
                let id = self.device(index, device)?;
                if let Some(spec) = self.platform.spec(&id) {
                    handle.device_added(spec.device)?;
                }
            }
            Step::RemoveDevice { device } => {
                let id = self.device(index, device)?;
                handle.device_removed(&id)?;
            }
            Step::UpdateDevice { device } => handle.device_updated(&self.device(index, device)?)?,
            Step::Cycle => handle.cycle_device()?,
            Step::Stop => handle.stop()?,
            Step::Background => handle.entered_background()?,
            Step::Foreground => handle.leaving_background()?,
            Step::Suspend => handle.suspending()?,
            Step::Resume => handle.resuming()?,
            Step::Tap {
                at,
                control,
                pointer,
            } => {
                let position = at.parse::<Point>().map_err(invalid)?;
                let control = control.parse::<Size>().map_err(invalid)?;
                handle.tap(TapEvent {
                    position,
                    control,
                    pointer: *pointer,
                })?;
            }
            Step::Orientation { value } => handle.orientation_changed(*value)?,
            Step::Resize { size } => handle.window_resized(size.parse().map_err(invalid)?)?,
            Step::Scan {
                device,
                symbology,
                label,
            } => handle.scan_received(
                &Self::device_id(index, device)?,
                ScanReport {
                    symbology: symbology.clone(),
                    label: label.clone(),
                },
            )?,
            Step::ScannerClosed { device } => {
                handle.scanner_closed(&Self::device_id(index, device)?)?
            }
            Step::CaptureFailed { reason } => handle.capture_failed(reason.clone())?,
            Step::ExclusiveAccess { held } => {
                self.platform.set_exclusive_holder(*held);
                let status = if *held {
                    ExclusiveAccessStatus::SharedReadOnlyAvailable
                } else {
                    ExclusiveAccessStatus::ExclusiveControlAvailable
                };
                handle.exclusive_access_changed(status)?;
            }
            Step::CameraPermission { granted } => self.platform.deny_camera_access(!granted),
            Step::FocusState { state } => self.platform.set_focus_state(*state),
            Step::Hold { device } => {
                let id = self.device(index, device)?;
                if let Some(previous) = self.held.replace(self.platform.hold(id)) {
                    previous.release();
                }
            }
            Step::Release => {
                let gate = self
                    .held
                    .take()
                    .ok_or(ScenarioError::NothingHeld { step: index })?;
                let reached = tokio::time::timeout(HOLD_TIMEOUT, gate.entered()).await;
                gate.release();
                reached.map_err(|_| ScenarioError::HoldNeverReached { step: index })?;
            }
        }
        Ok(())
    }
}
