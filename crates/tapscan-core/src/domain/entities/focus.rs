//! Focus control values used by the tap-to-focus protocol.

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Point, Rect, Size};
use crate::domain::value_objects::{FocusMode, FocusRange, PointerKind};

/// A tap on the preview control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapEvent {
    /// Position relative to the control's top-left corner.
    pub position: Point,
    /// Actual rendered size of the containing control.
    pub control: Size,
    #[serde(default)]
    pub pointer: PointerKind,
}

/// Normalized region currently registered with the camera.
///
/// `active == false` means the camera is back on continuous auto-focus and
/// `bounds` is [`Rect::EMPTY`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FocusRegion {
    pub bounds: Rect,
    pub active: bool,
}

impl FocusRegion {
    pub fn tapped(bounds: Rect) -> Self {
        Self {
            bounds,
            active: true,
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }
}

/// What a camera's focus control can do.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusCapabilities {
    pub supported: bool,
    pub ranges: Vec<FocusRange>,
    pub modes: Vec<FocusMode>,
}

impl FocusCapabilities {
    /// Full range when available, otherwise whatever the camera lists first.
    pub fn best_range(&self) -> Option<FocusRange> {
        if self.ranges.contains(&FocusRange::FullRange) {
            Some(FocusRange::FullRange)
        } else {
            self.ranges.first().copied()
        }
    }

    /// Single-shot when available, otherwise whatever the camera lists first.
    pub fn single_shot_mode(&self) -> Option<FocusMode> {
        if self.modes.contains(&FocusMode::Single) {
            Some(FocusMode::Single)
        } else {
            self.modes.first().copied()
        }
    }
}

/// Settings handed to `Camera::configure_focus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSettings {
    pub mode: Option<FocusMode>,
    pub range: Option<FocusRange>,
}

impl FocusSettings {
    pub const fn continuous() -> Self {
        Self {
            mode: Some(FocusMode::Continuous),
            range: Some(FocusRange::FullRange),
        }
    }
}

/// Region of interest registered with the camera. Bounds are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    pub bounds: Rect,
    pub auto_focus: bool,
    pub weight: u32,
}

impl RegionOfInterest {
    /// Focus-only region with full weight.
    pub fn focus(bounds: Rect) -> Self {
        Self {
            bounds,
            auto_focus: true,
            weight: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_range_prefers_full_range() {
        let caps = FocusCapabilities {
            supported: true,
            ranges: vec![FocusRange::Macro, FocusRange::FullRange],
            modes: vec![],
        };
        assert_eq!(caps.best_range(), Some(FocusRange::FullRange));
    }

    #[test]
    fn best_range_falls_back_to_first() {
        let caps = FocusCapabilities {
            supported: true,
            ranges: vec![FocusRange::Macro, FocusRange::Normal],
            modes: vec![],
        };
        assert_eq!(caps.best_range(), Some(FocusRange::Macro));
        assert_eq!(FocusCapabilities::default().best_range(), None);
    }

    #[test]
    fn single_shot_mode_prefers_single() {
        let caps = FocusCapabilities {
            supported: true,
            ranges: vec![],
            modes: vec![FocusMode::Continuous, FocusMode::Single],
        };
        assert_eq!(caps.single_shot_mode(), Some(FocusMode::Single));

        let no_single = FocusCapabilities {
            modes: vec![FocusMode::Auto, FocusMode::Continuous],
            ..caps
        };
        assert_eq!(no_single.single_shot_mode(), Some(FocusMode::Auto));
    }

    #[test]
    fn cleared_region_is_inactive_and_empty() {
        let r = FocusRegion::cleared();
        assert!(!r.active);
        assert!(r.bounds.is_empty());
    }
}
