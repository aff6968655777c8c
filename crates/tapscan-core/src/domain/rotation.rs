//! Preview rotation metadata and camera placement.
//!
//! Embedded cameras rotate with the device, so the preview stream needs a
//! rotation hint matching the display orientation. Front cameras are shown
//! mirrored, which inverts the direction of that rotation. External cameras
//! do not move with the display and get no hint at all.

use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

use crate::domain::value_objects::{EnclosureLocation, Orientation};

/// Vendor stream-property key carrying the preview rotation in degrees.
pub const ROTATION_PROPERTY_KEY: Uuid = uuid!("C380465D-2271-428C-9B83-ECEA3B4A85C1");

/// Where a camera sits relative to the display, as far as rendering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub external: bool,
    pub mirrored: bool,
}

impl CameraPlacement {
    /// Unknown or missing locations are treated as external cameras.
    pub fn from_location(location: Option<EnclosureLocation>) -> Self {
        match location {
            None | Some(EnclosureLocation::Unknown) | Some(EnclosureLocation::External) => Self {
                external: true,
                mirrored: false,
            },
            Some(EnclosureLocation::Front) => Self {
                external: false,
                mirrored: true,
            },
            Some(EnclosureLocation::Back) => Self {
                external: false,
                mirrored: false,
            },
        }
    }
}

impl Default for CameraPlacement {
    fn default() -> Self {
        Self::from_location(None)
    }
}

/// Clockwise preview rotation to write into the stream properties, or `None`
/// when the camera is external.
pub fn preview_rotation(orientation: Orientation, placement: CameraPlacement) -> Option<i32> {
    if placement.external {
        return None;
    }

    let degrees = i32::from(orientation.clockwise_degrees());
    if placement.mirrored {
        Some((360 - degrees) % 360)
    } else {
        Some(degrees)
    }
}
