//! Preview geometry: letterboxing and tap-to-focus coordinate transforms.
//!
//! Everything here is pure and total. Inputs that cannot describe a visible
//! preview (zero, negative or non-finite sizes) collapse to [`Rect::EMPTY`];
//! callers treat that as "no valid region", never as an error.
//!
//! ## Frames
//!
//! ```text
//!   control (on-screen)            sensor (native landscape)
//!  ┌──────────────────────┐        ┌──────────────────────┐
//!  │      letterbox       │        │                      │
//!  ├──────────────────────┤        │   active preview     │
//!  │   active preview     │ ─────▶ │   rect, rotated by   │
//!  ├──────────────────────┤        │   display rotation   │
//!  │      letterbox       │        │                      │
//!  └──────────────────────┘        └──────────────────────┘
//! ```
//!
//! Tap positions arrive in the control frame. The focus API wants a rectangle
//! normalized to `[0, 1]²` over the active preview, expressed in the sensor
//! frame.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::Orientation;

/// Default focus region edge as a fraction of the shorter control edge.
pub const DEFAULT_FOCUS_RATIO: f64 = 0.25;

// ── Primitives ───────────────────────────────────────────────────────────────

/// Width and height in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn shorter_edge(&self) -> f64 {
        self.width.min(self.height)
    }

    /// The same size seen from a frame rotated by 90°.
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Size {
    type Err = DomainError;

    /// Parses `WIDTHxHEIGHT`, e.g. `640x480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidSize {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| invalid("expected WIDTHxHEIGHT"))?;
        let width: f64 = w.trim().parse().map_err(|_| invalid("width is not a number"))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|_| invalid("height is not a number"))?;

        if width < 0.0 || height < 0.0 {
            return Err(invalid("dimensions must not be negative"));
        }
        Ok(Self { width, height })
    }
}

/// A position in the control frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = DomainError;

    /// Parses `X,Y`, e.g. `200,150`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidPoint {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (x, y) = s.trim().split_once(',').ok_or_else(|| invalid("expected X,Y"))?;
        let x: f64 = x.trim().parse().map_err(|_| invalid("x is not a number"))?;
        let y: f64 = y.trim().parse().map_err(|_| invalid("y is not a number"))?;
        Ok(Self { x, y })
    }
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// The "no valid region" rectangle.
    pub const EMPTY: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same rectangle described in a frame rotated by 90°.
    const fn transposed(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x: {:.4}, y: {:.4}, w: {:.4}, h: {:.4}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

// ── Active preview rectangle ─────────────────────────────────────────────────

/// Sub-region of the control that actually shows the stream once
/// letterboxing is applied.
///
/// Portrait orientations swap the stream dimensions first, since the sensor
/// reports its resolution in its native landscape frame.
pub fn active_preview_rect(control: Size, stream: Size, orientation: Orientation) -> Rect {
    if !control.is_drawable() || !stream.is_drawable() {
        return Rect::EMPTY;
    }

    let stream = if orientation.is_portrait() {
        stream.transposed()
    } else {
        stream
    };
    let stream_aspect = stream.aspect();

    if control.aspect() > stream_aspect {
        // Control is wider than the stream: bars left and right.
        let height = control.height;
        let width = height * stream_aspect;
        Rect::new((control.width - width) / 2.0, 0.0, width, height)
    } else {
        // Stream is at least as wide as the control: bars top and bottom.
        let width = control.width;
        let height = width / stream_aspect;
        Rect::new(0.0, (control.height - height) / 2.0, width, height)
    }
}

// ── Focus region ─────────────────────────────────────────────────────────────

/// Square focus region whose edge is `ratio` of the shorter control edge.
pub fn focus_region_size(control: Size, ratio: f64) -> Size {
    if !control.is_drawable() || !(ratio > 0.0) {
        return Size::default();
    }
    let edge = control.shorter_edge() * ratio;
    Size::new(edge, edge)
}

/// Converts a tap in the control frame into a focus rectangle normalized to
/// the active preview, in the sensor frame.
///
/// The region is centered on `tap`, rotated to compensate for `orientation`,
/// made relative to `preview` and finally pushed back inside the unit square
/// if it would stick out. An empty `preview` yields [`Rect::EMPTY`].
pub fn normalized_focus_region(
    tap: Point,
    region: Size,
    preview: Rect,
    orientation: Orientation,
) -> Rect {
    if preview.is_empty() {
        return Rect::EMPTY;
    }

    let left = tap.x - region.width / 2.0;
    let top = tap.y - region.height / 2.0;

    let (left, top) = match orientation {
        Orientation::Landscape => (left, top),
        Orientation::Portrait => (top, preview.width - left),
        Orientation::LandscapeFlipped => (preview.width - left, preview.height - top),
        Orientation::PortraitFlipped => (preview.width - top, left),
    };

    let frame = if orientation.is_portrait() {
        preview.transposed()
    } else {
        preview
    };

    let width = (region.width / frame.width).min(1.0);
    let height = (region.height / frame.height).min(1.0);

    let left = (left - frame.x) / frame.width;
    let top = (top - frame.y) / frame.height;

    Rect::new(
        left.max(0.0).min(1.0 - width),
        top.max(0.0).min(1.0 - height),
        width,
        height,
    )
}
