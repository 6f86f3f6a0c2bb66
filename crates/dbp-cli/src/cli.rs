//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dbpatch - apply versioned SQL patch files to a database exactly once
#[derive(Parser, Debug)]
#[command(name = "dbpatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./dbpatch.yml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database path (file path or :memory:)
    #[arg(short, long, global = true, env = "DBPATCH_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the version tracking table
    Init(InitArgs),

    /// Apply every patch newer than the current database version
    Patch(PatchArgs),

    /// Show the current version and the version log
    Status(StatusArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {}

/// Arguments for the patch command
#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Patch file path, e.g. ./patches/patch.sql
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// List the patches that would run without applying them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
