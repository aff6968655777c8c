//! `tapscan focus-region` — turn a tap into the rectangle handed to the
//! camera's region-of-interest API.

use serde::Serialize;

use tapscan_core::domain::{
    Orientation, Point, Rect, SessionConfig, Size, active_preview_rect, focus_region_size,
    normalized_focus_region,
};

use crate::{
    cli::{FocusRegionArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct FocusRegionReport {
    tap: Point,
    orientation: Orientation,
    preview: Rect,
    region: Size,
    bounds: Rect,
}

pub fn execute(args: FocusRegionArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let report = compute(&args, &config.session)?;

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    output.header("Focus region")?;
    output.field("tap", report.tap)?;
    output.field("orientation", report.orientation)?;
    output.field("preview", report.preview)?;
    output.field("region", report.region)?;
    output.field("bounds", report.bounds)?;
    if report.preview.is_empty() {
        output.warning("Preview has no area; the camera would get an empty region")?;
    }
    Ok(())
}

fn compute(args: &FocusRegionArgs, session: &SessionConfig) -> CliResult<FocusRegionReport> {
    let frame = &args.frame;
    let orientation = frame.orientation.unwrap_or(session.initial_orientation);

    let region = match (args.region, args.ratio) {
        (Some(region), _) => region,
        (None, Some(ratio)) => {
            // Same bounds as the config file enforces.
            SessionConfig {
                focus_region_ratio: ratio,
                ..session.clone()
            }
            .validate()
            .map_err(|source| CliError::InvalidInput {
                message: format!("--ratio {ratio}: {source}"),
                source: Some(Box::new(source)),
            })?;
            focus_region_size(frame.control, ratio)
        }
        (None, None) => focus_region_size(frame.control, session.focus_region_ratio),
    };

    let preview = active_preview_rect(frame.control, frame.stream, orientation);
    let bounds = normalized_focus_region(args.tap, region, preview, orientation);
    tracing::debug!(%preview, %bounds, "focus region computed");

    Ok(FocusRegionReport {
        tap: args.tap,
        orientation,
        preview,
        region,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::FrameArgs;

    fn args(tap: (f64, f64), ratio: Option<f64>, region: Option<Size>) -> FocusRegionArgs {
        FocusRegionArgs {
            tap: Point::new(tap.0, tap.1),
            frame: FrameArgs {
                control: Size::new(400.0, 400.0),
                stream: Size::new(640.0, 480.0),
                orientation: None,
            },
            region,
            ratio,
        }
    }

    #[test]
    fn default_ratio_comes_from_the_session_config() {
        let report = compute(&args((200.0, 200.0), None, None), &SessionConfig::default()).unwrap();
        assert_eq!(report.region, Size::new(100.0, 100.0));
        assert_eq!(report.preview, Rect::new(0.0, 50.0, 400.0, 300.0));
        assert!((report.bounds.width - 0.25).abs() < 1e-9);
        assert!((report.bounds.height - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_region_wins() {
        let report = compute(
            &args((200.0, 200.0), None, Some(Size::new(40.0, 30.0))),
            &SessionConfig::default(),
        )
        .unwrap();
        assert_eq!(report.region, Size::new(40.0, 30.0));
        assert!((report.bounds.width - 0.1).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_ratio_is_a_user_error() {
        let err = compute(&args((0.0, 0.0), Some(0.0), None), &SessionConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert!(err.to_string().contains("--ratio 0"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn orientation_falls_back_to_the_configured_one() {
        let session = SessionConfig {
            initial_orientation: Orientation::Portrait,
            ..SessionConfig::default()
        };
        let report = compute(&args((200.0, 200.0), None, None), &session).unwrap();
        assert_eq!(report.orientation, Orientation::Portrait);
        // 480x640 in a square control: bars left and right.
        assert_eq!(report.preview, Rect::new(50.0, 0.0, 300.0, 400.0));
    }
}
