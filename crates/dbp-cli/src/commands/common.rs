//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dbp_core::{Config, Version, VersionedPatch};
use dbp_db::{Database, DuckDbBackend};
use dbp_migrate::{PatchFailure, RunObserver, RunSummary};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run (connections close, transactions roll back).
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs maps it to the process exit status
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

const RULE: &str = "===========================================";

/// Load the configuration once and apply command-line overrides.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::load_from_dir_or_default(Path::new("."))
            .context("Failed to load dbpatch.yml")?,
    };

    if let Some(database) = &global.database {
        config.database.path = Some(database.clone());
    }

    Ok(config)
}

/// Open the target database described by `config`.
pub(crate) fn open_backend(config: &Config, global: &GlobalArgs) -> Result<Arc<DuckDbBackend>> {
    let path = config.database_path()?;
    let backend = DuckDbBackend::from_config(config)
        .with_context(|| format!("Failed to open database: {path}"))?;

    if global.verbose {
        eprintln!(
            "[verbose] Using {} database: {} (version table: {})",
            backend.db_type(),
            path,
            backend.version_table()
        );
    }
    Ok(Arc::new(backend))
}

/// Prints run progress to `out` (stdout for the `patch` command).
///
/// `[verbose]` lines always go to stderr.
pub(crate) struct ConsoleObserver<W> {
    out: Mutex<W>,
    verbose: bool,
}

impl<W: Write + Send> ConsoleObserver<W> {
    pub(crate) fn new(out: W, verbose: bool) -> Self {
        Self {
            out: Mutex::new(out),
            verbose,
        }
    }

    fn line(&self, text: impl fmt::Display) {
        // Best effort; a closed pipe must not abort a patch
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
            let _ = out.flush();
        }
    }
}

impl<W: Write + Send> RunObserver for ConsoleObserver<W> {
    fn run_started(&self, current: &Version, eligible: &[VersionedPatch]) {
        self.line(format_args!("Current Version: {current}"));
        if self.verbose {
            eprintln!("[verbose] {} patch(es) eligible", eligible.len());
        }
        self.line("Execute Start");
    }

    fn patch_started(&self, patch: &VersionedPatch) {
        self.line("");
        self.line(format_args!("Run Version: {}", patch.version));
        if self.verbose && !patch.comment.is_empty() {
            eprintln!("[verbose] {}", patch.comment);
        }
    }

    fn statement(&self, _patch: &VersionedPatch, _index: usize, sql: &str) {
        self.line(RULE);
        self.line(sql);
    }

    fn patch_failed(&self, _patch: &VersionedPatch, failure: &PatchFailure) {
        self.line(RULE);
        self.line("Execute fail !!!");
        self.line(&failure.message);
    }

    fn patch_applied(&self, _patch: &VersionedPatch) {
        self.line(RULE);
        self.line("");
        self.line("Execute Success");
        self.line("");
    }

    fn run_finished(&self, summary: &RunSummary) {
        if self.verbose {
            eprintln!(
                "[verbose] Applied {} patch(es), now at {}",
                summary.applied.len(),
                summary.final_version
            );
            if summary.not_attempted > 0 {
                eprintln!(
                    "[verbose] {} patch(es) not attempted after the failure",
                    summary.not_attempted
                );
            }
        }
        self.line("Execute End");
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
