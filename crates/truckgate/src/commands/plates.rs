//! Plate whitelist command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;
use truckgate_core::{
    HttpBackend, PlateCheck, PlateNumber, PlateRecord, PlateRegistry, SessionCoordinator,
};

use crate::cli::{GlobalOpts, PlatesArgs, PlatesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Added")]
    added: String,
}

impl From<&PlateRecord> for PlateRow {
    fn from(r: &PlateRecord) -> Self {
        Self {
            id: r.id.to_string(),
            plate: r.plate_number.clone(),
            added: util::local_time(r.created_at),
        }
    }
}

fn detail(r: &PlateRecord) -> String {
    [
        format!("ID:    {}", r.id),
        format!("Plate: {}", r.plate_number),
        format!("Added: {}", util::local_time(r.created_at)),
    ]
    .join("\n")
}

fn check_detail(c: &PlateCheck, color: bool) -> String {
    let verdict = match (c.authorized, color) {
        (true, true) => "AUTHORIZED".green().bold().to_string(),
        (false, true) => "DENIED".red().bold().to_string(),
        (true, false) => "AUTHORIZED".into(),
        (false, false) => "DENIED".into(),
    };
    match c.message {
        Some(ref msg) => format!("{}  {verdict}\n{msg}", c.plate_number),
        None => format!("{}  {verdict}", c.plate_number),
    }
}

/// Find the record matching either a record ID or a plate number.
async fn resolve_record(
    registry: &PlateRegistry<HttpBackend>,
    identifier: &str,
) -> Result<PlateRecord, CliError> {
    if PlateNumber::parse(identifier).is_ok() {
        if let Some(record) = registry.find(identifier).await? {
            return Ok(record);
        }
    }
    registry
        .list(None)
        .await?
        .into_iter()
        .find(|r| r.id.as_str() == identifier)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "plate".into(),
            identifier: identifier.into(),
            list_command: "plates list".into(),
        })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &SessionCoordinator<HttpBackend>,
    args: PlatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let registry = coordinator.plates();

    match args.command {
        PlatesCommand::List { search } => {
            let records = registry.list(search.as_deref()).await?;
            let out = output::render_list(global.output, &records, |r| PlateRow::from(r), |r| {
                r.plate_number.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlatesCommand::Add { plate } => {
            let normalized = PlateNumber::parse(&plate)?;
            match registry.add(&plate).await? {
                Some(record) => {
                    let out = output::render_single(global.output, &record, detail, |r| {
                        r.id.to_string()
                    });
                    output::print_output(&out, global.quiet);
                }
                None => {
                    if !global.quiet {
                        eprintln!("✓ {normalized} added to the whitelist");
                    }
                }
            }
            Ok(())
        }

        PlatesCommand::Remove { plate } => {
            let record = resolve_record(&registry, &plate).await?;
            let prompt = format!("Remove {} from the whitelist?", record.plate_number);
            if !util::confirm(&prompt, "plates remove", global.yes)? {
                eprintln!("Cancelled");
                return Ok(());
            }
            registry.remove(&record.id).await?;
            if !global.quiet {
                eprintln!("✓ {} removed", record.plate_number);
            }
            Ok(())
        }

        PlatesCommand::Check { plate } => {
            let check = registry.check(&plate).await?;
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &check,
                |c| check_detail(c, color),
                |c| if c.authorized { "authorized" } else { "denied" }.into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
