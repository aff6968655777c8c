//! Tapscan Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the tapscan
//! barcode-scanner session: a rotation-aware tap-to-focus geometry engine and
//! a scanner/camera session state machine, following hexagonal (ports and
//! adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           tapscan-cli (CLI)             │
//! │     (Drives the SessionHandle)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │    (SessionService actor + handle)      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (ScannerProvider, Camera, Display)     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    tapscan-adapters (Infrastructure)    │
//! │        (SimulatedPlatform, etc)         │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (geometry, rotation, DeviceList, ...)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tapscan_core::prelude::*;
//!
//! # async fn run(platform: Platform) -> TapscanResult<()> {
//! let (handle, task) = spawn(platform, SessionConfig::default());
//! let id: DeviceId = "usb-1".parse()?;
//! handle.device_added(Device::new(id, "Handheld", EnclosureLocation::External))?;
//! handle.flush().await?;
//! println!("{}", handle.snapshot().phase);
//! handle.shutdown()?;
//! let _ = task.await;
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        SessionHandle, SessionService, spawn,
        ports::{
            BarcodeScanner, Camera, CameraProvider, CaptureSettings, ClaimedScanner,
            DisplayRequest, Platform, PortResult, ScannerProvider,
        },
    };
    pub use crate::domain::{
        CameraPlacement, Device, DeviceId, EnclosureLocation, ExclusiveAccessStatus, Orientation,
        Point, PointerKind, Rect, ScanReport, SessionConfig, SessionPhase, SessionSnapshot, Size,
        TapEvent, active_preview_rect, focus_region_size, normalized_focus_region,
        preview_rotation,
    };
    pub use crate::error::{TapscanError, TapscanResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
