//! Camera command handlers.

use tabled::Tabled;
use truckgate_core::{CameraDescriptor, HttpBackend, SessionCoordinator};

use crate::cli::{CamerasArgs, CamerasCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "FPS")]
    fps: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl CameraRow {
    fn new(c: &CameraDescriptor, active_id: Option<u32>) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            resolution: c.resolution.clone(),
            fps: c.fps.map_or_else(|| "-".into(), |f| f.to_string()),
            active: if active_id == Some(c.id) { "●" } else { "" },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &SessionCoordinator<HttpBackend>,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CamerasCommand::List => {
            let inventory = coordinator.list_cameras().await?;
            if inventory.cameras.is_empty() && global.output == crate::cli::OutputFormat::Table {
                eprintln!("No cameras reported by the backend");
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                &inventory.cameras,
                |c| CameraRow::new(c, inventory.active_camera_id),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
