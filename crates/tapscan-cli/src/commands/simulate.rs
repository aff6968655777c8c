//! `tapscan simulate` — replay a scenario against the simulated platform.

use owo_colors::OwoColorize;

use tapscan_adapters::{Scenario, ScenarioReport, replay};
use tapscan_core::domain::{SessionPhase, SessionSnapshot};

use crate::{
    cli::{OutputFormat, SimulateArgs},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(args: SimulateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let scenario = Scenario::load(&args.scenario)?;
    tracing::info!(
        path = %args.scenario.display(),
        devices = scenario.devices.len(),
        steps = scenario.steps.len(),
        "replaying scenario"
    );

    // One session, one thread: events are processed strictly in order.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_cli_context(|| "Failed to start the session runtime")?;
    let report = runtime.block_on(replay(&scenario, config.session))?;

    if output.format() == OutputFormat::Json {
        output.json(&report)?;
        return Ok(());
    }

    render(&args, &report, &output)?;
    Ok(())
}

fn render(args: &SimulateArgs, report: &ScenarioReport, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Scenario {}", args.scenario.display()))?;
    for step in &report.steps {
        output.print(&format!(
            "  {:>3}  {:<18} {}",
            step.index,
            step.event,
            summarize(&step.snapshot, output.supports_color())
        ))?;
    }

    output.print("")?;
    output.header("Settled")?;
    let settled = &report.settled;
    output.field("phase", paint_phase(settled.phase, output.supports_color()))?;
    output.field("selected", device_or_dash(settled.selected_device.as_ref()))?;
    output.field("active", device_or_dash(settled.active_device.as_ref()))?;
    output.field("previewing", settled.previewing)?;
    output.field("orientation", settled.orientation)?;
    if settled.focus.active {
        output.field("focus", settled.focus.bounds)?;
    } else {
        output.field("focus", "continuous")?;
    }
    output.field("scans", settled.scan_count)?;
    if let Some(scan) = &settled.last_scan {
        output.field("last scan", format!("{} ({})", scan.label, scan.symbology))?;
    }
    output.field("max claims", report.max_concurrent_claims)?;

    if args.activity {
        output.print("")?;
        output.header("Platform activity")?;
        for (i, entry) in report.activity.iter().enumerate() {
            let line = serde_json::to_string(entry).unwrap_or_else(|_| format!("{entry:?}"));
            output.print(&format!("  {:>3}  {line}", i + 1))?;
        }
    }

    output.print("")?;
    if report.closed.is_fully_closed() {
        output.success("Session shut down with every resource released")?;
    } else {
        output.warning("Session shut down with resources still held")?;
    }
    Ok(())
}

fn summarize(snapshot: &SessionSnapshot, color: bool) -> String {
    let mut parts = vec![paint_phase(snapshot.phase, color)];
    if let Some(device) = &snapshot.active_device {
        parts.push(format!("active={device}"));
    }
    if snapshot.previewing {
        parts.push("preview".into());
    }
    if snapshot.awaiting_exclusive_access {
        parts.push("awaiting-access".into());
    }
    if snapshot.focus.active {
        parts.push(format!("focus={}", snapshot.focus.bounds));
    }
    if snapshot.scan_count > 0 {
        parts.push(format!("scans={}", snapshot.scan_count));
    }
    parts.join(" ")
}

fn paint_phase(phase: SessionPhase, color: bool) -> String {
    let text = phase.to_string();
    if !color {
        return text;
    }
    match phase {
        SessionPhase::Active => text.green().to_string(),
        SessionPhase::Idle => text.dimmed().to_string(),
        SessionPhase::Selecting | SessionPhase::Closing => text.yellow().to_string(),
    }
}

fn device_or_dash(device: Option<&impl std::fmt::Display>) -> String {
    device.map_or_else(|| "-".to_string(), ToString::to_string)
}
