//! `health` command: backend component status.

use std::fmt::Write;

use truckgate_core::{BackendHealth, HttpBackend, SessionCoordinator};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(h: &BackendHealth, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status:    {}", h.status);
    if let Some(ref msg) = h.message {
        let _ = writeln!(out, "Message:   {msg}");
    }
    for c in &h.components {
        let _ = writeln!(
            out,
            "  {:<17} {} ({})",
            c.name,
            output::yes_no(c.is_ok(), color),
            c.status
        );
    }
    if let Some(ref cam) = h.camera {
        let id = cam.camera_id.map_or_else(|| "-".into(), |id| id.to_string());
        let _ = writeln!(
            out,
            "Camera:    {id} (streaming: {}, detecting: {})",
            output::yes_no(cam.active, color),
            output::yes_no(cam.detection_active, color)
        );
    }
    let degraded: Vec<_> = h.degraded().map(|c| c.name.as_str()).collect();
    if !degraded.is_empty() {
        let _ = write!(out, "Degraded:  {}", degraded.join(", "));
    }
    out.trim_end().to_owned()
}

pub async fn handle(
    coordinator: &SessionCoordinator<HttpBackend>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    use truckgate_core::GateBackend;

    let health = coordinator.backend().health().await?;
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &health,
        |h| detail(h, color),
        |h| h.status.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
