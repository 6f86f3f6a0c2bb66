//! Single-patch execution

use crate::error::PatchFailure;
use crate::observer::RunObserver;
use dbp_core::{split_statements, Config, VersionedPatch};
use dbp_db::Database;
use std::sync::Arc;

/// Applies one patch atomically.
///
/// The patch body is split on the batch separator and every statement runs
/// inside one transaction. Either all statements commit or none of them are
/// visible afterwards.
pub struct PatchExecutor {
    db: Arc<dyn Database>,
    separator: String,
}

impl PatchExecutor {
    /// Create an executor splitting statements on `separator`
    pub fn new(db: Arc<dyn Database>, separator: impl Into<String>) -> Self {
        Self {
            db,
            separator: separator.into(),
        }
    }

    /// Create an executor using the configured batch separator
    pub fn from_config(db: Arc<dyn Database>, config: &Config) -> Self {
        Self::new(db, config.separator())
    }

    /// Statements the patch body splits into
    pub fn statements(&self, patch: &VersionedPatch) -> Vec<String> {
        split_statements(&patch.sql, &self.separator)
    }

    /// Apply `patch`, returning the number of statements executed.
    ///
    /// Failures are returned, never retried; the transaction has already
    /// been rolled back when this returns `Err`.
    pub async fn execute(
        &self,
        patch: &VersionedPatch,
        observer: &dyn RunObserver,
    ) -> Result<usize, PatchFailure> {
        let statements = self.statements(patch);
        let hook = |index: usize, sql: &str| {
            log::debug!("Patch {} statement {}: {}", patch.version, index + 1, sql);
            observer.statement(patch, index, sql);
        };

        match self.db.execute_in_transaction(&statements, &hook).await {
            Ok(()) => Ok(statements.len()),
            Err(e) => {
                let failure = PatchFailure::from_db_error(e, &statements);
                log::warn!("Patch {} rolled back: {}", patch.version, failure);
                observer.patch_failed(patch, &failure);
                Err(failure)
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
