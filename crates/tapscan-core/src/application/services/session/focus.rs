//! Tap-to-focus.
//!
//! The first tap locks continuous auto-focus and focuses on a region around
//! the tap. The next tap (or a tap while the camera is still searching)
//! clears the region and hands focus back to continuous auto-focus.

use tracing::{debug, instrument, warn};

use super::service::SessionService;
use crate::application::ports::{Camera, PortResult};
use crate::domain::{
    FocusCapabilities, FocusRegion, FocusSettings, FocusState, Rect, RegionOfInterest, TapEvent,
    active_preview_rect, focus_region_size, normalized_focus_region,
};

impl SessionService {
    #[instrument(skip_all, fields(x = tap.position.x, y = tap.position.y))]
    pub(super) async fn on_tap(&mut self, tap: TapEvent) {
        if !self.state.previewing {
            debug!("Tap ignored, no preview running");
            return;
        }
        let orientation = self.state.orientation;
        let ratio = self.config.focus_region_ratio;
        let focused = self.state.focus.active;

        let Some(camera) = self.state.camera.as_deref() else {
            return;
        };
        let capabilities = camera.focus_capabilities();
        if !capabilities.supported {
            debug!("Tap ignored, camera has no focus control");
            return;
        }

        if self.state.auto_focus {
            if let Err(e) = camera.lock_focus().await {
                warn!(error = %e, "Failed to lock focus");
            }
            self.state.auto_focus = false;
        }

        if !focused && camera.focus_state() != FocusState::Searching {
            let Some(stream) = camera.preview_resolution() else {
                debug!("Tap ignored, preview resolution unknown");
                self.publish();
                return;
            };
            let preview = active_preview_rect(tap.control, stream, orientation);
            if preview.is_empty() {
                debug!("Tap ignored, preview area is empty");
                self.publish();
                return;
            }
            let region = focus_region_size(tap.control, ratio);
            let bounds = normalized_focus_region(tap.position, region, preview, orientation);

            match focus_on_region(camera, &capabilities, bounds).await {
                Ok(()) => {
                    debug!(?bounds, "Focusing on tapped region");
                    self.state.focus = FocusRegion::tapped(bounds);
                }
                Err(e) => warn!(error = %e, "Tap to focus failed"),
            }
        } else {
            match restore_continuous_focus(camera).await {
                Ok(()) => {
                    debug!("Focus region cleared, continuous auto-focus restored");
                    self.state.focus = FocusRegion::cleared();
                    self.state.auto_focus = true;
                }
                Err(e) => warn!(error = %e, "Failed to clear the focus region"),
            }
        }
        self.publish();
    }
}

async fn focus_on_region(
    camera: &dyn Camera,
    capabilities: &FocusCapabilities,
    bounds: Rect,
) -> PortResult<()> {
    camera.configure_focus(FocusSettings {
        mode: capabilities.single_shot_mode(),
        range: capabilities.best_range(),
    })?;
    camera
        .set_region_of_interest(RegionOfInterest::focus(bounds))
        .await?;
    camera.focus().await
}

async fn restore_continuous_focus(camera: &dyn Camera) -> PortResult<()> {
    camera.clear_regions().await?;
    camera.unlock_focus().await?;
    camera.configure_focus(FocusSettings::continuous())?;
    camera.focus().await
}
