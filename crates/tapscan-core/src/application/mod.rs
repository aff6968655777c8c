//! Application layer for tapscan.
//!
//! This layer contains:
//! - **Services**: the scanner session actor and its handle
//! - **Ports**: Interface definitions (traits) for scanners, cameras and the display
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! geometry itself. Focus math and rotation rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{SessionHandle, SessionService, spawn};

// Re-export port traits (for adapter implementation)
pub use ports::{
    BarcodeScanner, Camera, CameraProvider, CaptureSettings, ClaimedScanner, DisplayRequest,
    Platform, PortResult, ScannerProvider,
};

pub use error::ApplicationError;
