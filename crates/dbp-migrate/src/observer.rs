//! Progress events emitted while a run executes.

use crate::error::PatchFailure;
use crate::runner::RunSummary;
use dbp_core::{Version, VersionedPatch};

/// Receives trace events from [`crate::MigrationRunner`] and
/// [`crate::PatchExecutor`]. Every method defaults to doing nothing.
pub trait RunObserver: Send + Sync {
    /// Current version has been read and the eligible patches selected
    fn run_started(&self, _current: &Version, _eligible: &[VersionedPatch]) {}

    /// A patch's transaction is about to open
    fn patch_started(&self, _patch: &VersionedPatch) {}

    /// A statement is about to execute
    fn statement(&self, _patch: &VersionedPatch, _index: usize, _sql: &str) {}

    /// A patch was rolled back
    fn patch_failed(&self, _patch: &VersionedPatch, _failure: &PatchFailure) {}

    /// A patch committed and its version was recorded
    fn patch_applied(&self, _patch: &VersionedPatch) {}

    /// The run ended, normally or at a failed patch
    fn run_finished(&self, _summary: &RunSummary) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}
