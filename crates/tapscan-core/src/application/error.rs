//! Application layer errors.
//!
//! These errors represent failures talking to devices or to the session
//! actor, not geometry mistakes. Parse errors are `DomainError` from
//! `crate::domain`.
//!
//! None of them is fatal to the session: the service logs them and degrades
//! to a "feature unavailable" state visible in the snapshot flags.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while orchestrating scanners and cameras.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The user or the platform refused access to the capture device.
    #[error("Access to camera '{device}' was denied")]
    PermissionDenied { device: String },

    /// Another client holds exclusive control of the camera.
    #[error("Camera '{device}' is held exclusively by another client")]
    ExclusiveAccessConflict { device: String },

    /// A device could not be resolved, claimed or enabled.
    #[error("Device '{id}' is unavailable: {reason}")]
    DeviceUnavailable { id: String, reason: String },

    /// A port call failed for another reason.
    #[error("{operation} failed: {reason}")]
    Port {
        operation: &'static str,
        reason: String,
    },

    /// The session actor has stopped; the handle is dangling.
    #[error("Scanner session is closed")]
    SessionClosed,

    /// The shared device list lock was poisoned.
    #[error("Device list is unavailable")]
    DeviceListLock,
}

impl ApplicationError {
    /// Shorthand for [`ApplicationError::Port`].
    pub fn port(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Port {
            operation,
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::PermissionDenied { device } => vec![
                format!("Camera '{}' refused access", device),
                "Allow camera access in the system privacy settings".into(),
            ],
            Self::ExclusiveAccessConflict { .. } => vec![
                "Another application is using the camera".into(),
                "The preview restarts once exclusive access is released".into(),
            ],
            Self::DeviceUnavailable { id, .. } => vec![
                format!("Scanner '{}' could not be claimed", id),
                "Check that the device is connected and not claimed elsewhere".into(),
            ],
            Self::SessionClosed => vec![
                "The session was shut down before the request was delivered".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PermissionDenied { .. } => ErrorCategory::Unavailable,
            Self::ExclusiveAccessConflict { .. } => ErrorCategory::Unavailable,
            Self::DeviceUnavailable { .. } => ErrorCategory::NotFound,
            Self::Port { .. } => ErrorCategory::Internal,
            Self::SessionClosed | Self::DeviceListLock => ErrorCategory::Internal,
        }
    }
}
