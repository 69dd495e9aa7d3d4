//! Command dispatch: bridges CLI args -> coordinator calls -> output formatting.

pub mod cameras;
pub mod config_cmd;
pub mod health;
pub mod monitor;
pub mod plates;
pub mod util;

use truckgate_core::{HttpBackend, SessionCoordinator};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a backend-bound command needs.
pub struct Context {
    pub coordinator: SessionCoordinator<HttpBackend>,
    /// Profile's `default_camera`, used when `monitor --camera` is omitted.
    pub default_camera: Option<u32>,
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Cameras(args) => cameras::handle(&ctx.coordinator, args, global).await,
        Command::Monitor(args) => monitor::handle(ctx, args, global).await,
        Command::Plates(args) => plates::handle(&ctx.coordinator, args, global).await,
        Command::Health => health::handle(&ctx.coordinator, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
