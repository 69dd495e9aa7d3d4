//! `monitor` command: run a detection session and stream gate decisions.
//!
//! Starts camera + detection on the chosen camera, prints each dispatched
//! detection to stdout and each gate phase change to stderr, and tears the
//! session down on Ctrl-C, `q`, or when `--duration` elapses. Typing `r`
//! acknowledges the current decision and returns the gate to READY.

use std::io::{BufRead, IsTerminal};
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use truckgate_core::{DetectionResult, GateAction, GateState};

use crate::cli::{GlobalOpts, MonitorArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Keyboard commands read from an interactive stdin.
enum Key {
    Reset,
    Quit,
}

pub async fn handle(ctx: &Context, args: MonitorArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = &ctx.coordinator;
    let camera_id = args
        .camera
        .or(ctx.default_camera)
        .ok_or_else(|| CliError::Validation {
            field: "camera".into(),
            reason: "pass --camera <id> or set default_camera on the profile".into(),
        })?;
    let color = output::should_color(global.color);

    // Subscribe before starting so the first decision can't slip past.
    let mut detections = coordinator.detections();
    let mut gate = coordinator.gate_stream();

    // Ctrl-C during startup must still stop whatever got started: the
    // handler is raced against the start instead of installed after it.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let spinner = start_spinner(global.quiet, camera_id);
    let start = coordinator.start_session(camera_id);
    tokio::pin!(start);
    let (started, interrupted) = tokio::select! {
        res = &mut start => (Some(res), false),
        res = &mut ctrl_c => {
            if let Err(e) = res {
                warn!(error = %e, "ctrl-c handler failed");
            }
            spinner.set_message("Interrupted, waiting for startup to settle...");
            (None, true)
        }
    };
    let started = match started {
        Some(res) => res,
        None => start.await,
    };
    spinner.finish_and_clear();

    if interrupted {
        debug!(started = started.is_ok(), "interrupted during startup");
        coordinator.shutdown().await?;
        if !global.quiet {
            eprintln!("■ Interrupted before the session came up, camera stopped");
        }
        return Ok(());
    }
    let session = started?;

    if !global.quiet {
        let stream = session
            .stream()
            .map_or_else(|| "-".into(), ToString::to_string);
        eprintln!("● Camera {camera_id} active, stream: {stream}");
        eprintln!("  Ctrl-C or q to stop, r to acknowledge the gate");
    }

    let mut keys = spawn_key_reader();
    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!(error = %e, "ctrl-c handler failed");
                }
                break;
            }
            () = &mut deadline => {
                debug!("monitor duration elapsed");
                break;
            }
            recv = detections.recv() => match recv {
                Ok(result) => {
                    let line = render_detection(global.output, &result, color);
                    output::print_output(&line, global.quiet);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "monitor fell behind, detections dropped from view");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(state) = gate.changed() => {
                if !global.quiet {
                    eprintln!("{}", phase_line(&state, color));
                }
            }
            Some(key) = keys.recv() => match key {
                Key::Reset => coordinator.reset_gate(),
                Key::Quit => break,
            },
        }
    }

    let stats = coordinator.poller_stats();
    coordinator.shutdown().await?;

    if !global.quiet {
        eprintln!(
            "■ Session ended: {} detections, {} failed polls, {} malformed",
            stats.dispatched, stats.fetch_failures, stats.protocol_errors
        );
    }
    Ok(())
}

fn start_spinner(quiet: bool, camera_id: u32) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Starting camera {camera_id} and detection..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Forward `r` / `q` lines from an interactive stdin. A plain thread
/// keeps the blocking read from holding up runtime shutdown.
fn spawn_key_reader() -> mpsc::Receiver<Key> {
    let (tx, rx) = mpsc::channel(4);
    if std::io::stdin().is_terminal() {
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let key = match line.trim() {
                    "r" | "R" => Key::Reset,
                    "q" | "Q" => Key::Quit,
                    _ => continue,
                };
                if tx.blocking_send(key).is_err() {
                    break;
                }
            }
        });
    }
    rx
}

// ── Rendering ────────────────────────────────────────────────────────

/// Structured formats emit one document per detection (NDJSON for JSON).
fn render_detection(format: OutputFormat, r: &DetectionResult, color: bool) -> String {
    match format {
        OutputFormat::Table => detection_line(r, color),
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(r, true),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(r).trim_end()),
        OutputFormat::Plain => format!(
            "{}\t{}",
            r.plate_text.as_deref().unwrap_or("-"),
            r.gate_action
        ),
    }
}

fn detection_line(r: &DetectionResult, color: bool) -> String {
    let time = r.observed_at.with_timezone(&Local).format("%H:%M:%S");
    let plate = r.plate_text.as_deref().unwrap_or("(no plate)");
    let vehicle = r.vehicle_type.as_deref().unwrap_or("-");
    let action = r.gate_action.to_string().to_uppercase();
    let action = if color {
        match r.gate_action {
            GateAction::Open => action.green().bold().to_string(),
            GateAction::Denied => action.red().bold().to_string(),
            GateAction::Closed | GateAction::Unknown => action.dimmed().to_string(),
        }
    } else {
        action
    };
    let flag = if r.confidence_clamped { "*" } else { "" };
    let mut line = format!(
        "[{time}] {plate:<12} {vehicle:<8} {:>4.0}%{flag}  {action}",
        r.confidence * 100.0
    );
    if let Some(ref msg) = r.message {
        line.push_str("  ");
        line.push_str(msg);
    }
    line
}

fn phase_line(state: &GateState, color: bool) -> String {
    let label = output::phase_label(state.phase, color);
    match state.reset_deadline {
        Some(deadline) => {
            let secs = deadline.saturating_duration_since(state.entered_at).as_secs();
            format!("gate → {label} (resets in {secs}s)")
        }
        None => format!("gate → {label}"),
    }
}
