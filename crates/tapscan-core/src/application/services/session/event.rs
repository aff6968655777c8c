//! Messages delivered to the session actor.

use tokio::sync::oneshot;

use crate::domain::{DeviceId, ExclusiveAccessStatus, Orientation, ScanReport, Size, TapEvent};

/// Why resources are being released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseReason {
    Stop,
    Background,
    Suspend,
    Shutdown,
}

impl CloseReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Background => "background",
            Self::Suspend => "suspend",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Everything that can happen to a session.
///
/// Device list mutations happen on the handle side; the actor only learns
/// what changed.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// Select the device after the current one, wrapping around.
    CycleDevice,
    /// Re-acquire the selected device (resume, leaving background).
    Reselect,
    DeviceAdded { id: DeviceId, first: bool },
    DeviceRemoved { id: DeviceId, former_index: usize },
    DeviceUpdated(DeviceId),
    Close(CloseReason),
    Tap(TapEvent),
    OrientationChanged(Orientation),
    WindowResized(Size),
    ScanReceived { device: DeviceId, report: ScanReport },
    ScannerClosed(DeviceId),
    CaptureFailed(String),
    ExclusiveAccessChanged(ExclusiveAccessStatus),
    /// Answered once every earlier event has been handled.
    Flush(oneshot::Sender<()>),
}

impl SessionEvent {
    /// Short name for logs.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::CycleDevice => "cycle-device",
            Self::Reselect => "reselect",
            Self::DeviceAdded { .. } => "device-added",
            Self::DeviceRemoved { .. } => "device-removed",
            Self::DeviceUpdated(_) => "device-updated",
            Self::Close(_) => "close",
            Self::Tap(_) => "tap",
            Self::OrientationChanged(_) => "orientation-changed",
            Self::WindowResized(_) => "window-resized",
            Self::ScanReceived { .. } => "scan-received",
            Self::ScannerClosed(_) => "scanner-closed",
            Self::CaptureFailed(_) => "capture-failed",
            Self::ExclusiveAccessChanged(_) => "exclusive-access-changed",
            Self::Flush(_) => "flush",
        }
    }
}
