//! Scanner devices and the enumerated device list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::EnclosureLocation;

/// Opaque platform identifier of a scanner device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device id, rejecting the empty string.
    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            Err(DomainError::EmptyDeviceId)
        } else {
            Ok(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl FromStr for DeviceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s)
    }
}

impl TryFrom<&str> for DeviceId {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

/// A discovered scanner. Immutable once enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub location: EnclosureLocation,
}

impl Device {
    pub fn new(id: DeviceId, name: impl Into<String>, location: EnclosureLocation) -> Self {
        Self {
            id,
            name: name.into(),
            location,
        }
    }
}

/// Devices in enumeration order.
///
/// Order matters: "next device" rotation and removal replacement are both
/// index based.
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    devices: Vec<Device>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a device. Returns `false` (and changes nothing) when a device
    /// with the same id is already listed.
    pub fn add(&mut self, device: Device) -> bool {
        if self.contains(&device.id) {
            return false;
        }
        self.devices.push(device);
        true
    }

    /// Remove a device, returning the index it occupied.
    pub fn remove(&mut self, id: &DeviceId) -> Option<usize> {
        let index = self.index_of(id)?;
        self.devices.remove(index);
        Some(index)
    }

    pub fn index_of(&self, id: &DeviceId) -> Option<usize> {
        self.devices.iter().position(|d| &d.id == id)
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn first(&self) -> Option<&Device> {
        self.devices.first()
    }

    /// Device after `current` in list order, wrapping around.
    ///
    /// With no current device, or one that is no longer listed, this is the
    /// first device.
    pub fn next_after(&self, current: Option<&DeviceId>) -> Option<&Device> {
        if self.devices.is_empty() {
            return None;
        }
        let next = current
            .and_then(|id| self.index_of(id))
            .map_or(0, |i| (i + 1) % self.devices.len());
        self.devices.get(next)
    }

    /// Device that took over `former_index` after a removal, else the first.
    pub fn replacement_for(&self, former_index: usize) -> Option<&Device> {
        self.devices.get(former_index).or_else(|| self.first())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }
}
