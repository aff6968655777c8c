pub mod device;
pub mod focus;
pub mod session;

pub use crate::domain::DomainError;
pub use device::{Device, DeviceId, DeviceList};
pub use focus::{FocusCapabilities, FocusRegion, FocusSettings, RegionOfInterest, TapEvent};
pub use session::{
    AfterSelection, PendingRequests, ScanReport, SessionConfig, SessionPhase, SessionSnapshot,
};
