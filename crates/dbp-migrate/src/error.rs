//! Error types for dbp-migrate

use dbp_core::CoreError;
use dbp_db::DbError;
use std::fmt;
use thiserror::Error;

/// Errors that stop a run before or between patches.
///
/// A failing patch statement is not one of these: it is reported through
/// [`crate::RunSummary::failure`].
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Patch file parsing or version handling failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Version log access failed
    #[error(transparent)]
    Db(#[from] DbError),

    /// The latest version log row does not hold a valid version (P003)
    #[error("[P003] Recorded version '{version}' is invalid")]
    InvalidRecordedVersion {
        version: String,
        #[source]
        source: CoreError,
    },

    /// A patch committed but its version log row could not be written (P004)
    #[error("[P004] Patch {version} was applied but recording it failed")]
    RecordFailed {
        version: String,
        #[source]
        source: DbError,
    },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Why a patch was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFailure {
    /// Zero-based index of the failing statement; `None` when the transaction
    /// itself could not be opened or committed
    pub statement_index: Option<usize>,

    /// Text of the failing statement
    pub statement: Option<String>,

    /// Driver error message
    pub message: String,
}

impl PatchFailure {
    pub(crate) fn from_db_error(err: DbError, statements: &[String]) -> Self {
        match err {
            DbError::StatementFailed { index, message } => Self {
                statement_index: Some(index),
                statement: statements.get(index).cloned(),
                message,
            },
            other => Self {
                statement_index: None,
                statement: None,
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for PatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.statement_index {
            Some(index) => write!(f, "statement {} failed: {}", index + 1, self.message),
            None => f.write_str(&self.message),
        }
    }
}
