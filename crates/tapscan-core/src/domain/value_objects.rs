//! Domain value objects: orientation, enclosure location, pointer kind and
//! the camera control vocabularies (focus modes, ranges, states).
//!
//! These are pure value types: `Copy`, equality-by-value, no identity. The
//! geometry and rotation rules that consume them live in `geometry.rs` and
//! `rotation.rs`.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Orientation ──────────────────────────────────────────────────────────────

/// Display orientation, one of four rotations of the logical frame.
///
/// The camera sensor always reports its stream in its native landscape frame;
/// portrait variants rotate the display, not the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    LandscapeFlipped,
    PortraitFlipped,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Self::Landscape,
        Self::Portrait,
        Self::LandscapeFlipped,
        Self::PortraitFlipped,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::LandscapeFlipped => "landscape-flipped",
            Self::PortraitFlipped => "portrait-flipped",
        }
    }

    pub const fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait | Self::PortraitFlipped)
    }

    /// Clockwise rotation of the display relative to the sensor frame.
    pub const fn clockwise_degrees(self) -> u16 {
        match self {
            Self::Landscape => 0,
            Self::Portrait => 90,
            Self::LandscapeFlipped => 180,
            Self::PortraitFlipped => 270,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            "landscape-flipped" | "landscapeflipped" => Ok(Self::LandscapeFlipped),
            "portrait-flipped" | "portraitflipped" => Ok(Self::PortraitFlipped),
            _ => Err(DomainError::InvalidOrientation {
                value: s.to_string(),
            }),
        }
    }
}

// ── EnclosureLocation ────────────────────────────────────────────────────────

/// Platform-reported physical placement of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnclosureLocation {
    Front,
    Back,
    External,
    #[default]
    Unknown,
}

impl EnclosureLocation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::External => "external",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EnclosureLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnclosureLocation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" | "rear" => Ok(Self::Back),
            "external" | "usb" => Ok(Self::External),
            "unknown" => Ok(Self::Unknown),
            _ => Err(DomainError::InvalidLocation {
                value: s.to_string(),
            }),
        }
    }
}

// ── PointerKind ──────────────────────────────────────────────────────────────

/// Device that produced a tap gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Touch,
    Pen,
    Mouse,
}

impl fmt::Display for PointerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Touch => "touch",
            Self::Pen => "pen",
            Self::Mouse => "mouse",
        })
    }
}

impl FromStr for PointerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "touch" => Ok(Self::Touch),
            "pen" => Ok(Self::Pen),
            "mouse" => Ok(Self::Mouse),
            _ => Err(DomainError::InvalidPointerKind {
                value: s.to_string(),
            }),
        }
    }
}

// ── Camera control vocabularies ──────────────────────────────────────────────

/// Focus modes a camera may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    Auto,
    Single,
    Continuous,
    Manual,
}

/// Auto-focus search ranges a camera may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusRange {
    FullRange,
    Macro,
    Normal,
}

/// What the focus engine is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusState {
    #[default]
    Uninitialized,
    Lost,
    Searching,
    Focused,
    Failed,
}

/// Optical image stabilization modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StabilizationMode {
    Off,
    On,
    Auto,
}

/// Exclusive-control status reported by a camera after a sharing conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExclusiveAccessStatus {
    /// Another client holds the camera; only a read-only view is possible.
    SharedReadOnlyAvailable,
    /// Exclusive control can be taken again.
    ExclusiveControlAvailable,
}
