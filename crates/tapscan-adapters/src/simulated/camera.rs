//! Simulated capture devices.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use tapscan_core::{
    application::{ApplicationError, Camera, CameraProvider, CaptureSettings, PortResult},
    domain::{
        EnclosureLocation, FocusCapabilities, FocusMode, FocusRange, FocusSettings, FocusState,
        ROTATION_PROPERTY_KEY, RegionOfInterest, Size, StabilizationMode,
    },
};

use super::{Activity, DeviceSpec, SimulatedPlatform};

#[async_trait]
impl CameraProvider for SimulatedPlatform {
    async fn camera_location(&self, video_device_id: &str) -> Option<EnclosureLocation> {
        self.spec_for_video(video_device_id)
            .map(|spec| spec.device.location)
    }

    async fn open(&self, settings: &CaptureSettings) -> PortResult<Box<dyn Camera>> {
        let video = settings.video_device_id.clone();
        let denied = self.with(|inner| inner.camera_denied).unwrap_or(false);
        if denied {
            self.record(Activity::CameraDenied {
                video: video.clone(),
            });
            return Err(ApplicationError::PermissionDenied { device: video });
        }

        let spec = self.spec_for_video(&video).ok_or_else(|| {
            ApplicationError::DeviceUnavailable {
                id: video.clone(),
                reason: "no such capture device".into(),
            }
        })?;
        self.record(Activity::CameraOpened {
            video: video.clone(),
        });
        Ok(Box::new(SimulatedCamera {
            platform: self.clone(),
            video,
            spec,
            previewing: AtomicBool::new(false),
        }))
    }
}

/// An open simulated capture device.
#[derive(Debug)]
pub struct SimulatedCamera {
    platform: SimulatedPlatform,
    video: String,
    spec: DeviceSpec,
    previewing: AtomicBool,
}

impl SimulatedCamera {
    fn require_focus(&self, operation: &'static str) -> PortResult<()> {
        if !self.spec.focus {
            return Err(ApplicationError::port(operation, "focus control not supported"));
        }
        Ok(())
    }
}

#[async_trait]
impl Camera for SimulatedCamera {
    async fn start_preview(&self) -> PortResult<()> {
        let blocked = self
            .platform
            .with(|inner| inner.exclusive_holder)
            .unwrap_or(false);
        if blocked {
            self.platform.record(Activity::PreviewBlocked {
                video: self.video.clone(),
            });
            return Err(ApplicationError::ExclusiveAccessConflict {
                device: self.video.clone(),
            });
        }
        self.previewing.store(true, Ordering::SeqCst);
        self.platform.record(Activity::PreviewStarted {
            video: self.video.clone(),
        });
        Ok(())
    }

    async fn stop_preview(&self) -> PortResult<()> {
        if !self.previewing.swap(false, Ordering::SeqCst) {
            return Err(ApplicationError::port("stop preview", "preview not running"));
        }
        self.platform.record(Activity::PreviewStopped {
            video: self.video.clone(),
        });
        Ok(())
    }

    fn preview_resolution(&self) -> Option<Size> {
        self.previewing
            .load(Ordering::SeqCst)
            .then_some(self.spec.stream)
    }

    async fn set_stream_property(&self, key: Uuid, value: i32) -> PortResult<()> {
        if key == ROTATION_PROPERTY_KEY {
            self.platform.record(Activity::Rotation { degrees: value });
        }
        Ok(())
    }

    fn focus_capabilities(&self) -> FocusCapabilities {
        if !self.spec.focus {
            return FocusCapabilities::default();
        }
        FocusCapabilities {
            supported: true,
            ranges: vec![FocusRange::FullRange, FocusRange::Macro, FocusRange::Normal],
            modes: vec![FocusMode::Auto, FocusMode::Single, FocusMode::Continuous],
        }
    }

    fn focus_state(&self) -> FocusState {
        self.platform
            .with(|inner| inner.focus_state)
            .unwrap_or_default()
    }

    async fn lock_focus(&self) -> PortResult<()> {
        self.require_focus("lock focus")?;
        self.platform.record(Activity::FocusLocked);
        Ok(())
    }

    async fn unlock_focus(&self) -> PortResult<()> {
        self.require_focus("unlock focus")?;
        self.platform.record(Activity::FocusUnlocked);
        Ok(())
    }

    fn configure_focus(&self, settings: FocusSettings) -> PortResult<()> {
        self.require_focus("configure focus")?;
        self.platform.record(Activity::FocusConfigured {
            mode: settings.mode,
            range: settings.range,
        });
        Ok(())
    }

    async fn focus(&self) -> PortResult<()> {
        self.require_focus("focus")?;
        self.platform.record(Activity::Focused);
        Ok(())
    }

    async fn set_region_of_interest(&self, region: RegionOfInterest) -> PortResult<()> {
        self.require_focus("set region of interest")?;
        self.platform.record(Activity::FocusRegion {
            bounds: region.bounds,
        });
        Ok(())
    }

    async fn clear_regions(&self) -> PortResult<()> {
        self.platform.record(Activity::RegionsCleared);
        Ok(())
    }

    fn white_balance_supported(&self) -> bool {
        self.spec.white_balance
    }

    async fn set_white_balance_auto(&self) -> PortResult<()> {
        if !self.spec.white_balance {
            return Err(ApplicationError::port("white balance", "not supported"));
        }
        self.platform.record(Activity::WhiteBalanceAuto);
        Ok(())
    }

    fn stabilization_modes(&self) -> Vec<StabilizationMode> {
        if self.spec.stabilization {
            vec![StabilizationMode::Off, StabilizationMode::On, StabilizationMode::Auto]
        } else {
            Vec::new()
        }
    }

    fn set_stabilization(&self, mode: StabilizationMode) -> PortResult<()> {
        if !self.spec.stabilization {
            return Err(ApplicationError::port("stabilization", "not supported"));
        }
        self.platform.record(Activity::Stabilization { mode });
        Ok(())
    }

    async fn close(&self) {
        self.previewing.store(false, Ordering::SeqCst);
        self.platform.record(Activity::CameraClosed {
            video: self.video.clone(),
        });
    }
}
