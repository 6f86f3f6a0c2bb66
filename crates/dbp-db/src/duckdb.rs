//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, StatementHook, VersionRecord, VersionStore};
use async_trait::async_trait;
use dbp_core::sql_utils::{identity_sequence_name, quote_qualified};
use dbp_core::Config;
use duckdb::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Default name of the version log table
pub const DEFAULT_VERSION_TABLE: &str = "db_version";

/// DuckDB database backend
///
/// Holds one root connection that keeps the database open. Every unit of
/// work (a version read, a patch transaction, a version append) runs on its
/// own connection cloned from the root and dropped when the work is done.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    version_table: String,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open the database described by `config`, using its version table
    pub fn from_config(config: &Config) -> DbResult<Self> {
        let path = config
            .database_path()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::new(path)?.with_version_table(&config.version_table))
    }

    /// Use `table` (optionally schema-qualified) for the version log
    pub fn with_version_table(mut self, table: &str) -> Self {
        self.version_table = table.to_string();
        self
    }

    /// Name of the version log table
    pub fn version_table(&self) -> &str {
        &self.version_table
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            version_table: DEFAULT_VERSION_TABLE.to_string(),
        }
    }

    /// Open a fresh connection to the same database for one unit of work
    fn connect(&self) -> DbResult<Connection> {
        let root = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        root.try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run statements in one transaction synchronously
    fn execute_in_transaction_sync(
        &self,
        statements: &[String],
        on_statement: StatementHook<'_>,
    ) -> DbResult<()> {
        let mut conn = self.connect()?;
        // Dropping `tx` without commit rolls back, covering every early exit
        let tx = conn
            .transaction()
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

        for (index, statement) in statements.iter().enumerate() {
            on_statement(index, statement);
            if let Err(e) = tx.execute_batch(statement) {
                if let Err(rollback_err) = tx.rollback() {
                    log::warn!("ROLLBACK after failed statement also failed: {rollback_err}");
                }
                return Err(DbError::StatementFailed {
                    index,
                    message: e.to_string(),
                });
            }
        }

        tx.commit()
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.connect()?;
        let (schema, table) = name.rsplit_once('.').unwrap_or(("main", name));

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.connect()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM ({sql})"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn ensure_version_table_sync(&self) -> DbResult<()> {
        let table = quote_qualified(&self.version_table);
        let sequence = quote_qualified(&identity_sequence_name(&self.version_table));

        let mut ddl = String::new();
        if let Some((schema, _)) = self.version_table.rsplit_once('.') {
            ddl.push_str(&format!(
                "CREATE SCHEMA IF NOT EXISTS {};\n",
                quote_qualified(schema)
            ));
        }
        ddl.push_str(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {sequence} START 1;
             CREATE TABLE IF NOT EXISTS {table} (
                 db_version_id BIGINT PRIMARY KEY DEFAULT nextval('{seq_literal}'),
                 version       VARCHAR(10) NOT NULL,
                 comment       VARCHAR(255),
                 patch_time    TIMESTAMP DEFAULT current_timestamp
             );",
            seq_literal = identity_sequence_name(&self.version_table).replace('\'', "''"),
        ));

        let conn = self.connect()?;
        conn.execute_batch(&ddl).map_err(|e| {
            DbError::ExecutionError(format!(
                "failed to create version table {}: {e}",
                self.version_table
            ))
        })
    }

    fn current_version_sync(&self) -> DbResult<Option<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT version FROM {} ORDER BY db_version_id DESC LIMIT 1",
            quote_qualified(&self.version_table)
        ))?;
        let mut rows = stmt.query([])?;
        let version = match rows.next()? {
            Some(row) => Some(row.get::<_, String>(0)?),
            None => None,
        };
        Ok(version)
    }

    fn append_version_sync(&self, version: &str, comment: &str) -> DbResult<()> {
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (version, comment) VALUES (?, ?)",
                quote_qualified(&self.version_table)
            ),
            duckdb::params![version, comment],
        )?;
        Ok(())
    }

    fn version_history_sync(&self) -> DbResult<Vec<VersionRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT db_version_id, version, COALESCE(comment, ''), COALESCE(CAST(patch_time AS VARCHAR), '')
             FROM {}
             ORDER BY db_version_id",
            quote_qualified(&self.version_table)
        ))?;
        let records = stmt
            .query_map([], |row| {
                Ok(VersionRecord {
                    id: row.get(0)?,
                    version: row.get(1)?,
                    comment: row.get(2)?,
                    patch_time: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn execute_in_transaction(
        &self,
        statements: &[String],
        on_statement: StatementHook<'_>,
    ) -> DbResult<()> {
        self.execute_in_transaction_sync(statements, on_statement)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[async_trait]
impl VersionStore for DuckDbBackend {
    async fn ensure_version_table(&self) -> DbResult<()> {
        self.ensure_version_table_sync()
    }

    async fn current_version(&self) -> DbResult<Option<String>> {
        self.current_version_sync()
    }

    async fn append_version(&self, version: &str, comment: &str) -> DbResult<()> {
        self.append_version_sync(version, comment)
    }

    async fn version_history(&self) -> DbResult<Vec<VersionRecord>> {
        self.version_history_sync()
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
