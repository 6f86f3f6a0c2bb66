//! Database trait definitions

use crate::error::DbResult;
use async_trait::async_trait;

/// Callback invoked with the index and text of each statement before it runs
pub type StatementHook<'a> = &'a (dyn Fn(usize, &str) + Send + Sync);

/// Database abstraction trait for dbpatch
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one or more `;`-separated statements outside a transaction
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute `statements` in order inside a single transaction.
    ///
    /// The first failing statement rolls the whole transaction back and is
    /// reported as [`crate::DbError::StatementFailed`]; later statements are
    /// not run. `on_statement` is called before each statement executes.
    async fn execute_in_transaction(
        &self,
        statements: &[String],
        on_statement: StatementHook<'_>,
    ) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Count the rows returned by a query
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// One row of the version log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Surrogate identity; insertion order
    pub id: i64,

    /// Version text as recorded
    pub version: String,

    /// Patch comment (may be empty)
    pub comment: String,

    /// Insert timestamp rendered by the database
    pub patch_time: String,
}

/// Append-only log of applied patch versions stored in the target database.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Create the version table and its identity sequence if missing
    async fn ensure_version_table(&self) -> DbResult<()>;

    /// Version of the most recently inserted row, by identity rather than by
    /// version value. `None` when the log is empty.
    async fn current_version(&self) -> DbResult<Option<String>>;

    /// Append a row for a successfully applied patch
    async fn append_version(&self, version: &str, comment: &str) -> DbResult<()>;

    /// All rows in insertion order
    async fn version_history(&self) -> DbResult<Vec<VersionRecord>>;
}
