//! `tapscan preview-rect` — where the stream lands inside the control.

use serde::Serialize;

use tapscan_core::domain::{Orientation, Rect, Size, active_preview_rect};

use crate::{
    cli::{OutputFormat, PreviewRectArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct PreviewRectReport {
    control: Size,
    stream: Size,
    orientation: Orientation,
    preview: Rect,
    empty: bool,
}

pub fn execute(args: PreviewRectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let frame = args.frame;
    let orientation = frame
        .orientation
        .unwrap_or(config.session.initial_orientation);
    let preview = active_preview_rect(frame.control, frame.stream, orientation);

    let report = PreviewRectReport {
        control: frame.control,
        stream: frame.stream,
        orientation,
        preview,
        empty: preview.is_empty(),
    };

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    output.header("Active preview rectangle")?;
    output.field("control", report.control)?;
    output.field("stream", report.stream)?;
    output.field("orientation", report.orientation)?;
    output.field("preview", report.preview)?;
    if report.empty {
        output.warning("Control or stream has no area; nothing is visible")?;
    }
    Ok(())
}
