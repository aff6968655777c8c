//! Infrastructure adapters for tapscan.
//!
//! This crate implements the ports defined in `tapscan-core::application::ports`
//! with a deterministic simulated platform, and replays TOML scenario files
//! against a live session.

pub mod scenario;
pub mod simulated;

// Re-export commonly used adapters
pub use scenario::{Scenario, ScenarioError, ScenarioReport, Step, StepRecord, replay};
pub use simulated::{
    Activity, DeviceSpec, SelectionGate, SimulatedCamera, SimulatedClaim, SimulatedPlatform,
    SimulatedScanner,
};
