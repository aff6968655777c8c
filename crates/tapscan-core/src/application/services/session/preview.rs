//! Camera preview lifecycle for scanners with a video device.

use tracing::{debug, info, warn};

use super::service::SessionService;
use crate::application::ApplicationError;
use crate::application::ports::{CaptureSettings, PortResult};
use crate::domain::{
    CameraPlacement, FocusRegion, FocusSettings, ROTATION_PROPERTY_KEY, StabilizationMode,
    preview_rotation,
};

impl SessionService {
    /// Open the capture device behind the claimed scanner and start previewing.
    pub(super) async fn start_preview(&mut self, video_device_id: String) {
        let location = self
            .platform
            .cameras
            .camera_location(&video_device_id)
            .await;
        let placement = CameraPlacement::from_location(location);
        debug!(
            external = placement.external,
            mirrored = placement.mirrored,
            "Camera placement resolved"
        );
        self.state.placement = Some(placement);

        let settings = CaptureSettings::exclusive_video(video_device_id);
        let camera = match self.platform.cameras.open(&settings).await {
            Ok(camera) => camera,
            Err(ApplicationError::PermissionDenied { device }) => {
                warn!(%device, "The app was denied access to the camera");
                self.state.placement = None;
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize the camera");
                self.state.placement = None;
                return;
            }
        };

        self.platform.display.request_active();
        self.state.display_active = true;
        self.state.camera = Some(camera);
        self.begin_preview().await;
    }

    /// Start the stream on the already open camera.
    ///
    /// Also used to retry after exclusive control comes back.
    pub(super) async fn begin_preview(&mut self) {
        let Some(camera) = self.state.camera.as_deref() else {
            return;
        };
        match camera.start_preview().await {
            Ok(()) => {}
            Err(ApplicationError::ExclusiveAccessConflict { device }) => {
                info!(%device, "Waiting for exclusive access to the camera");
                self.state.awaiting_exclusive_access = true;
                self.publish();
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to start the preview");
                return;
            }
        }

        self.state.awaiting_exclusive_access = false;
        self.state.previewing = true;
        info!("Preview started");

        self.apply_rotation().await;
        self.enable_continuous_focus().await;
        self.apply_image_controls().await;
        self.publish();
    }

    /// Tag the stream with the rotation matching the current orientation.
    pub(super) async fn apply_rotation(&mut self) {
        let (Some(camera), Some(placement)) =
            (self.state.camera.as_deref(), self.state.placement)
        else {
            return;
        };
        let Some(degrees) = preview_rotation(self.state.orientation, placement) else {
            debug!("External camera, preview rotation left untouched");
            return;
        };
        match camera
            .set_stream_property(ROTATION_PROPERTY_KEY, degrees)
            .await
        {
            Ok(()) => debug!(degrees, "Preview rotation applied"),
            Err(e) => warn!(error = %e, "Failed to set the preview rotation"),
        }
    }

    async fn enable_continuous_focus(&mut self) {
        let Some(camera) = self.state.camera.as_deref() else {
            return;
        };
        if !camera.focus_capabilities().supported {
            debug!("Camera has no focus control");
            return;
        }
        let result: PortResult<()> = async {
            camera.unlock_focus().await?;
            camera.configure_focus(FocusSettings::continuous())?;
            camera.focus().await
        }
        .await;
        match result {
            Ok(()) => {
                self.state.auto_focus = true;
                self.state.focus = FocusRegion::cleared();
            }
            Err(e) => warn!(error = %e, "Failed to enable continuous auto-focus"),
        }
    }

    async fn apply_image_controls(&mut self) {
        let Some(camera) = self.state.camera.as_deref() else {
            return;
        };

        if self.config.apply_stabilization
            && camera
                .stabilization_modes()
                .contains(&StabilizationMode::Auto)
        {
            if let Err(e) = camera.set_stabilization(StabilizationMode::Auto) {
                warn!(error = %e, "Failed to enable optical stabilization");
            }
        }

        if self.config.apply_white_balance && camera.white_balance_supported() {
            if let Err(e) = camera.set_white_balance_auto().await {
                warn!(error = %e, "Failed to set auto white balance");
            }
        }
    }

    /// Stop the stream, dispose the camera and forget preview state.
    pub(super) async fn stop_preview(&mut self) {
        if let Some(camera) = self.state.camera.take() {
            if self.state.previewing {
                if let Err(e) = camera.stop_preview().await {
                    warn!(error = %e, "Failed to stop the preview");
                }
            }
            camera.close().await;
            debug!("Camera closed");
        }
        self.state.previewing = false;
        self.state.awaiting_exclusive_access = false;
        self.state.placement = None;
        self.state.focus = FocusRegion::cleared();
        self.state.auto_focus = false;
    }
}
