//! dbp-db - Database layer for dbpatch
//!
//! This crate provides the `Database` and `VersionStore` traits and their
//! DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Database, VersionRecord, VersionStore};
