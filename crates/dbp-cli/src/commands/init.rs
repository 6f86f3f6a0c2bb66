//! Init command implementation

use anyhow::{Context, Result};
use dbp_db::VersionStore;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common::{load_config, open_backend};

/// Execute the init command
pub async fn execute(_args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let backend = open_backend(&config, global)?;

    backend
        .ensure_version_table()
        .await
        .with_context(|| format!("Failed to create version table: {}", config.version_table))?;

    println!("Execute Success");
    Ok(())
}
