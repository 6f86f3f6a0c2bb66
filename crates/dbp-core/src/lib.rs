//! dbp-core - Core library for dbpatch
//!
//! This crate provides the version type and its ordering, the patch file
//! parser, statement splitting, and configuration loading shared by the
//! database, migration, and CLI crates.

pub mod config;
pub mod error;
pub mod parser;
pub mod patch;
pub mod sql_utils;
pub mod version;

pub use config::{Config, DatabaseConfig, DbType};
pub use error::{CoreError, CoreResult};
pub use parser::{parse_patches, split_statements};
pub use patch::VersionedPatch;
pub use version::{compare, Version};
