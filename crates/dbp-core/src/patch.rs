//! Patch records extracted from a patch file

use crate::version::Version;

/// One versioned block of SQL from a patch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedPatch {
    /// Version the database reaches once this patch is applied
    pub version: Version,

    /// Free-text description, trimmed (may be empty)
    pub comment: String,

    /// SQL body, trimmed; may hold several batches split by the separator line
    pub sql: String,
}

impl VersionedPatch {
    /// Create a patch, trimming the comment and SQL body.
    pub fn new(version: Version, comment: &str, sql: &str) -> Self {
        Self {
            version,
            comment: comment.trim().to_string(),
            sql: sql.trim().to_string(),
        }
    }
}
