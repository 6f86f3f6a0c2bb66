//! Patch command implementation

use anyhow::{Context, Result};
use dbp_db::DbError;
use dbp_migrate::{MigrateError, MigrationRunner};
use std::fs;
use std::io;

use crate::cli::{GlobalArgs, PatchArgs};
use crate::commands::common::{load_config, open_backend, ConsoleObserver, ExitCode};

/// Execute the patch command
pub async fn execute(args: &PatchArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let patch_text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read patch file: {}", args.file.display()))?;

    let backend = open_backend(&config, global)?;
    let runner = MigrationRunner::from_config(backend, &config);

    if args.dry_run {
        let plan = runner
            .plan(&patch_text)
            .await
            .map_err(|e| explain(e, &config.version_table))?;

        println!("Current Version: {}", plan.current_version);
        if plan.patches.is_empty() {
            println!("Nothing to apply ({} patch(es) in file)", plan.parsed);
        } else {
            println!("Would apply {} of {} patch(es):", plan.patches.len(), plan.parsed);
            for patch in &plan.patches {
                if patch.comment.is_empty() {
                    println!("  {}", patch.version);
                } else {
                    println!("  {} - {}", patch.version, patch.comment);
                }
            }
        }
        return Ok(());
    }

    let observer = ConsoleObserver::new(io::stdout(), global.verbose);
    let summary = runner
        .run(&patch_text, &observer)
        .await
        .map_err(|e| explain(e, &config.version_table))?;

    if !summary.is_success() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Attach an operator hint to errors with an obvious fix.
fn explain(err: MigrateError, version_table: &str) -> anyhow::Error {
    match err {
        MigrateError::Db(DbError::TableNotFound(_)) => anyhow::Error::new(err).context(format!(
            "Version table '{version_table}' not found; run `dbpatch init` first"
        )),
        other => anyhow::Error::new(other).context("Patch run failed"),
    }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod tests;
