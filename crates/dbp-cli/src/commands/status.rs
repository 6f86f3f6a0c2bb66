//! Status command implementation

use anyhow::{Context, Result};
use dbp_db::{Database, VersionStore};
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{load_config, open_backend};

/// Status report for JSON output
#[derive(Debug, Serialize)]
struct StatusReport {
    database: String,
    version_table: String,
    initialized: bool,
    current_version: Option<String>,
    history: Vec<HistoryEntry>,
}

/// One version log row for JSON output
#[derive(Debug, Serialize)]
struct HistoryEntry {
    id: i64,
    version: String,
    comment: String,
    patch_time: String,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let backend = open_backend(&config, global)?;

    let initialized = backend
        .relation_exists(&config.version_table)
        .await
        .context("Failed to inspect database")?;

    let history = if initialized {
        backend
            .version_history()
            .await
            .context("Failed to read version log")?
    } else {
        Vec::new()
    };

    let report = StatusReport {
        database: config.database_path()?.to_string(),
        version_table: config.version_table.clone(),
        initialized,
        // Latest insert, matching what a patch run would read
        current_version: history.last().map(|r| r.version.trim().to_string()),
        history: history
            .into_iter()
            .map(|r| HistoryEntry {
                id: r.id,
                version: r.version.trim().to_string(),
                comment: r.comment,
                patch_time: r.patch_time,
            })
            .collect(),
    };

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &StatusReport) {
    println!("Database: {}", report.database);
    if !report.initialized {
        println!(
            "Version table '{}' does not exist. Run `dbpatch init`.",
            report.version_table
        );
        return;
    }

    println!(
        "Current Version: {}",
        report.current_version.as_deref().unwrap_or("0")
    );
    if report.history.is_empty() {
        println!("No patches recorded");
        return;
    }

    println!();
    println!("{:>6}  {:<10}  {:<26}  COMMENT", "ID", "VERSION", "PATCH TIME");
    for entry in &report.history {
        println!(
            "{:>6}  {:<10}  {:<26}  {}",
            entry.id, entry.version, entry.patch_time, entry.comment
        );
    }
}
