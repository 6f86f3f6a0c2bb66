//! The migration run loop.
//!
//! A run reads the current version from the version log, parses the patch
//! file once, selects the eligible patches, and applies them one at a time.
//! Each committed patch appends a version log row before the next patch
//! starts. The first failed patch ends the run; patches committed earlier in
//! the same run stay committed.

use crate::error::{MigrateError, MigrateResult, PatchFailure};
use crate::executor::PatchExecutor;
use crate::observer::RunObserver;
use dbp_core::{parse_patches, Config, Version, VersionedPatch};
use dbp_db::{Database, VersionStore};
use std::sync::Arc;

/// Patches that a run would apply, without applying them
#[derive(Debug, Clone)]
pub struct Plan {
    /// Version read from the version log (`0` when empty)
    pub current_version: Version,

    /// Number of well-formed blocks in the patch file
    pub parsed: usize,

    /// Eligible patches in file order
    pub patches: Vec<VersionedPatch>,
}

/// A patch committed during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    pub version: Version,
    pub comment: String,
    pub statements: usize,
}

/// The patch that stopped a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPatch {
    pub version: Version,
    pub failure: PatchFailure,
}

/// Outcome of [`MigrationRunner::run`]
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Version at the start of the run
    pub starting_version: Version,

    /// Committed patches, in the order applied
    pub applied: Vec<AppliedPatch>,

    /// Set when a patch was rolled back and the run halted
    pub failure: Option<FailedPatch>,

    /// Eligible patches never attempted because of the failure
    pub not_attempted: usize,

    /// Version recorded last (equal to the starting version if nothing applied)
    pub final_version: Version,
}

impl RunSummary {
    /// True when every eligible patch committed
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Keep the patches newer than `current`, in file order.
///
/// The threshold moves up to each kept patch, so a block whose version is not
/// above the one before it is passed over. Patches are never re-sorted.
pub fn eligible_patches(patches: Vec<VersionedPatch>, current: &Version) -> Vec<VersionedPatch> {
    let mut threshold = current.clone();
    let mut eligible = Vec::new();

    for patch in patches {
        if patch.version > threshold {
            threshold = patch.version.clone();
            eligible.push(patch);
        } else {
            log::debug!(
                "Skipping patch {} (not above {})",
                patch.version,
                threshold
            );
        }
    }

    eligible
}

/// Applies a patch file to a database, tracking progress in its version log.
pub struct MigrationRunner {
    store: Arc<dyn VersionStore>,
    executor: PatchExecutor,
}

impl MigrationRunner {
    /// Create a runner from a version store and a patch executor
    pub fn new(store: Arc<dyn VersionStore>, executor: PatchExecutor) -> Self {
        Self { store, executor }
    }

    /// Create a runner for a backend that provides both traits
    pub fn from_config<B>(backend: Arc<B>, config: &Config) -> Self
    where
        B: Database + VersionStore + 'static,
    {
        let db: Arc<dyn Database> = backend.clone();
        Self::new(backend, PatchExecutor::from_config(db, config))
    }

    /// Read the current version; an empty log means version `0`
    pub async fn current_version(&self) -> MigrateResult<Version> {
        match self.store.current_version().await? {
            Some(raw) if !raw.trim().is_empty() => Version::parse(&raw)
                .map_err(|source| MigrateError::InvalidRecordedVersion {
                    version: raw,
                    source,
                }),
            _ => Ok(Version::initial()),
        }
    }

    /// Work out which patches in `patch_text` a run would apply
    pub async fn plan(&self, patch_text: &str) -> MigrateResult<Plan> {
        let current_version = self.current_version().await?;
        let patches = parse_patches(patch_text)?;
        let parsed = patches.len();

        Ok(Plan {
            patches: eligible_patches(patches, &current_version),
            current_version,
            parsed,
        })
    }

    /// Apply every eligible patch in `patch_text`, stopping at the first failure.
    ///
    /// A rolled-back patch is reported in [`RunSummary::failure`]. Errors reading
    /// or writing the version log, or parsing the file, are returned as `Err`.
    pub async fn run(
        &self,
        patch_text: &str,
        observer: &dyn RunObserver,
    ) -> MigrateResult<RunSummary> {
        let plan = self.plan(patch_text).await?;
        let mut summary = RunSummary {
            starting_version: plan.current_version.clone(),
            applied: Vec::new(),
            failure: None,
            not_attempted: 0,
            final_version: plan.current_version.clone(),
        };
        observer.run_started(&plan.current_version, &plan.patches);

        let total = plan.patches.len();
        for (position, patch) in plan.patches.iter().enumerate() {
            observer.patch_started(patch);

            match self.executor.execute(patch, observer).await {
                Ok(statements) => {
                    self.store
                        .append_version(patch.version.as_str(), &patch.comment)
                        .await
                        .map_err(|source| MigrateError::RecordFailed {
                            version: patch.version.to_string(),
                            source,
                        })?;
                    log::info!("Applied patch {}", patch.version);

                    summary.final_version = patch.version.clone();
                    summary.applied.push(AppliedPatch {
                        version: patch.version.clone(),
                        comment: patch.comment.clone(),
                        statements,
                    });
                    observer.patch_applied(patch);
                }
                Err(failure) => {
                    summary.failure = Some(FailedPatch {
                        version: patch.version.clone(),
                        failure,
                    });
                    summary.not_attempted = total - position - 1;
                    break;
                }
            }
        }

        observer.run_finished(&summary);
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
