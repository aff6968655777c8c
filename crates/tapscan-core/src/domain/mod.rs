// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for tapscan.
//!
//! Pure logic only. Device, camera and display access happen through ports
//! (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: geometry and session values are synchronous
//! - **No I/O**: no device, camera or filesystem calls
//! - **Total functions**: degenerate geometry yields an empty rectangle
//! - **Immutable entities**: devices are Clone + PartialEq
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod geometry;
pub mod rotation;
pub mod value_objects;

// Re-exports for convenience
pub use entities::{
    AfterSelection, Device, DeviceId, DeviceList, FocusCapabilities, FocusRegion, FocusSettings,
    PendingRequests, RegionOfInterest, ScanReport, SessionConfig, SessionPhase, SessionSnapshot,
    TapEvent,
};

pub use error::{DomainError, ErrorCategory};

pub use geometry::{
    DEFAULT_FOCUS_RATIO, Point, Rect, Size, active_preview_rect, focus_region_size,
    normalized_focus_region,
};

pub use rotation::{CameraPlacement, ROTATION_PROPERTY_KEY, preview_rotation};

pub use value_objects::{
    EnclosureLocation, ExclusiveAccessStatus, FocusMode, FocusRange, FocusState, Orientation,
    PointerKind, StabilizationMode,
};
