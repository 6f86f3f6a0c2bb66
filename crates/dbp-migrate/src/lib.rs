//! dbp-migrate - Patch execution for dbpatch
//!
//! [`PatchExecutor`] applies one patch inside a single transaction and
//! [`MigrationRunner`] drives the executor over every eligible patch in a
//! patch file, appending to the version log after each commit and stopping at
//! the first failure.

pub mod error;
pub mod executor;
pub mod observer;
pub mod runner;

pub use error::{MigrateError, MigrateResult, PatchFailure};
pub use executor::PatchExecutor;
pub use observer::{RunObserver, SilentObserver};
pub use runner::{eligible_patches, AppliedPatch, FailedPatch, MigrationRunner, Plan, RunSummary};
