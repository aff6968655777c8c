//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `tapscan-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ScannerProvider`, `BarcodeScanner`, `ClaimedScanner`: scanner lifecycle
//!   - `CameraProvider`, `Camera`: capture device, preview and focus control
//!   - `DisplayRequest`: keep the screen on during preview
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `SessionHandle` in `crate::application::services`

pub mod output;

pub use output::{
    BarcodeScanner, Camera, CameraProvider, CaptureSettings, ClaimedScanner, DisplayRequest,
    Platform, PortResult, ScannerProvider,
};

#[cfg(test)]
pub use output::{
    MockBarcodeScanner, MockCamera, MockCameraProvider, MockClaimedScanner, MockDisplayRequest,
    MockScannerProvider,
};
