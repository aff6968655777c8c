// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// The geometry engine itself never fails (degenerate input collapses to an
/// empty rectangle), so these errors only come from parsing user-supplied
/// values at the edges: CLI flags, config files and scenario files.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Parse Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid orientation '{value}'")]
    InvalidOrientation { value: String },

    #[error("Invalid enclosure location '{value}'")]
    InvalidLocation { value: String },

    #[error("Invalid size '{value}': {reason}")]
    InvalidSize { value: String, reason: String },

    #[error("Invalid point '{value}': {reason}")]
    InvalidPoint { value: String, reason: String },

    #[error("Invalid pointer kind '{value}'")]
    InvalidPointerKind { value: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Device id must not be empty")]
    EmptyDeviceId,

    #[error("Focus region ratio {ratio} is outside (0, 1]")]
    InvalidFocusRatio { ratio: f64 },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidOrientation { value } => vec![
                format!("'{}' is not a display orientation", value),
                "Use one of: landscape, portrait, landscape-flipped, portrait-flipped".into(),
            ],
            Self::InvalidLocation { value } => vec![
                format!("'{}' is not an enclosure location", value),
                "Use one of: front, back, external, unknown".into(),
            ],
            Self::InvalidSize { .. } => vec![
                "Sizes are written as WIDTHxHEIGHT".into(),
                "Example: --control 400x300".into(),
            ],
            Self::InvalidPoint { .. } => vec![
                "Points are written as X,Y".into(),
                "Example: --tap 200,150".into(),
            ],
            Self::InvalidPointerKind { .. } => {
                vec!["Use one of: touch, pen, mouse".into()]
            }
            Self::EmptyDeviceId => vec!["Give every device a non-empty id".into()],
            Self::InvalidFocusRatio { .. } => vec![
                "session.focus_region_ratio must be greater than 0 and at most 1".into(),
                "The default is 0.25 (a quarter of the shorter edge)".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidOrientation { .. }
            | Self::InvalidLocation { .. }
            | Self::InvalidSize { .. }
            | Self::InvalidPoint { .. }
            | Self::InvalidPointerKind { .. } => ErrorCategory::Validation,
            Self::EmptyDeviceId | Self::InvalidFocusRatio { .. } => ErrorCategory::Constraint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Constraint,
}
