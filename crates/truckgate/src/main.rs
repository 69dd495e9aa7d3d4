mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use truckgate_core::{CoordinatorConfig, HttpBackend, SessionCoordinator};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "truckgate", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config_or_default();
            let backend_config = config::resolve_backend_config(&cli.global, &cfg)?;
            tracing::debug!(url = %backend_config.url, "resolved backend");

            let mut coordinator_config = CoordinatorConfig::from(cfg.defaults.session);
            if let Command::Monitor(ref args) = cmd {
                if let Some(ms) = args.poll_interval {
                    coordinator_config.poll_interval = std::time::Duration::from_millis(ms);
                }
            }

            let backend = HttpBackend::new(&backend_config)?;
            let coordinator = SessionCoordinator::new(backend, coordinator_config)?;
            let ctx = commands::Context {
                coordinator,
                default_camera: config::default_camera(&cli.global, &cfg),
            };

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}
