use super::*;
use crate::observer::SilentObserver;
use dbp_db::DuckDbBackend;
use std::sync::Mutex;

/// Records run events as short strings, in order.
#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl RunObserver for EventLog {
    fn run_started(&self, current: &Version, eligible: &[VersionedPatch]) {
        self.push(format!("start {current} ({} eligible)", eligible.len()));
    }

    fn patch_started(&self, patch: &VersionedPatch) {
        self.push(format!("patch {}", patch.version));
    }

    fn statement(&self, _patch: &VersionedPatch, index: usize, _sql: &str) {
        self.push(format!("stmt {index}"));
    }

    fn patch_failed(&self, patch: &VersionedPatch, _failure: &PatchFailure) {
        self.push(format!("failed {}", patch.version));
    }

    fn patch_applied(&self, patch: &VersionedPatch) {
        self.push(format!("applied {}", patch.version));
    }

    fn run_finished(&self, summary: &RunSummary) {
        self.push(format!("end {}", summary.final_version));
    }
}

const PATCHES: &str = r#"
###NEW_VERSION### Version=1.0
###COMMENT### base
###SQL###
CREATE TABLE products (id INT, name VARCHAR);
###END###

###NEW_VERSION### Version=1.1
###COMMENT### add price
###SQL###
ALTER TABLE products ADD COLUMN price DECIMAL(10, 2);
GO
INSERT INTO products VALUES (1, 'widget', 9.99);
###END###

###NEW_VERSION### Version=2.0
###COMMENT### categories
###SQL###
CREATE TABLE categories (id INT);
GO
INSERT INTO categories VALUES (1);
###END###
"#;

async fn runner_at(version: Option<&str>) -> (Arc<DuckDbBackend>, MigrationRunner) {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    db.ensure_version_table().await.unwrap();
    if let Some(version) = version {
        db.append_version(version, "baseline").await.unwrap();
    }
    let runner = MigrationRunner::from_config(db.clone(), &Config::default());
    (db, runner)
}

fn versions(patches: &[VersionedPatch]) -> Vec<&str> {
    patches.iter().map(|p| p.version.as_str()).collect()
}

fn patch(version: &str) -> VersionedPatch {
    VersionedPatch::new(Version::parse(version).unwrap(), "", "SELECT 1")
}

#[test]
fn test_eligible_patches_strictly_greater() {
    let patches = vec![patch("0.9"), patch("1.0"), patch("1.0.1"), patch("2")];
    let eligible = eligible_patches(patches, &Version::parse("1.0").unwrap());
    assert_eq!(versions(&eligible), vec!["1.0.1", "2"]);
}

#[test]
fn test_eligible_patches_keep_file_order_and_skip_regressions() {
    let patches = vec![patch("3"), patch("2"), patch("4"), patch("4"), patch("1.10")];
    let eligible = eligible_patches(patches, &Version::initial());
    assert_eq!(versions(&eligible), vec!["3", "4"]);
}

#[test]
fn test_eligible_patches_numeric_comparison() {
    let patches = vec![patch("1.9"), patch("1.10")];
    let eligible = eligible_patches(patches, &Version::parse("1.2").unwrap());
    assert_eq!(versions(&eligible), vec!["1.9", "1.10"]);
}

#[tokio::test]
async fn test_empty_log_is_version_zero() {
    let (_db, runner) = runner_at(None).await;
    assert_eq!(runner.current_version().await.unwrap(), Version::initial());
}

#[tokio::test]
async fn test_invalid_recorded_version() {
    let (_db, runner) = runner_at(Some("beta")).await;
    let err = runner.current_version().await.unwrap_err();
    assert!(matches!(err, MigrateError::InvalidRecordedVersion { .. }));

    // The cause is reachable through `source`, not repeated in the message
    assert_eq!(err.to_string(), "[P003] Recorded version 'beta' is invalid");
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.starts_with("[C001]"), "got: {cause}");
}

#[tokio::test]
async fn test_missing_version_table_is_error() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let runner = MigrationRunner::from_config(db, &Config::default());
    let err = runner.run(PATCHES, &SilentObserver).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Db(dbp_db::DbError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_wrapped_db_error_is_rendered_once() {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    let runner = MigrationRunner::from_config(db, &Config::default());
    let err = runner.run(PATCHES, &SilentObserver).await.unwrap_err();

    let rendered = err.to_string();
    assert!(rendered.starts_with("[D003]"), "got: {rendered}");
    assert!(std::error::Error::source(&err).is_none());
}

#[tokio::test]
async fn test_plan_does_not_apply() {
    let (db, runner) = runner_at(Some("1.0")).await;
    let plan = runner.plan(PATCHES).await.unwrap();

    assert_eq!(plan.current_version.as_str(), "1.0");
    assert_eq!(plan.parsed, 3);
    assert_eq!(versions(&plan.patches), vec!["1.1", "2.0"]);
    assert_eq!(db.version_history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_applies_in_order_then_is_idempotent() {
    let (db, runner) = runner_at(Some("1.0")).await;
    db.execute_batch("CREATE TABLE products (id INT, name VARCHAR);")
        .await
        .unwrap();
    let log = EventLog::default();

    let summary = runner.run(PATCHES, &log).await.unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.starting_version.as_str(), "1.0");
    assert_eq!(summary.final_version.as_str(), "2.0");
    let applied: Vec<&str> = summary.applied.iter().map(|a| a.version.as_str()).collect();
    assert_eq!(applied, vec!["1.1", "2.0"]);
    assert_eq!(summary.applied[0].comment, "add price");
    assert_eq!(summary.applied[0].statements, 2);

    assert_eq!(
        log.events(),
        vec![
            "start 1.0 (2 eligible)",
            "patch 1.1",
            "stmt 0",
            "stmt 1",
            "applied 1.1",
            "patch 2.0",
            "stmt 0",
            "stmt 1",
            "applied 2.0",
            "end 2.0",
        ]
    );

    let history = db.version_history().await.unwrap();
    let recorded: Vec<&str> = history.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(recorded, vec!["1.0", "1.1", "2.0"]);
    assert_eq!(history[2].comment, "categories");

    let second = runner.run(PATCHES, &SilentObserver).await.unwrap();
    assert!(second.applied.is_empty());
    assert!(second.is_success());
    assert_eq!(second.final_version.as_str(), "2.0");
    assert_eq!(db.version_history().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_failure_halts_run_and_keeps_earlier_patches() {
    let text = r#"
###NEW_VERSION### Version=1.1
###SQL###
CREATE TABLE suppliers (id INT);
###END###
###NEW_VERSION### Version=2.0
###SQL###
CREATE TABLE shipments (id INT);
GO
INSERT INTO missing_table VALUES (1);
###END###
###NEW_VERSION### Version=3.0
###SQL###
CREATE TABLE never_reached (id INT);
###END###
"#;
    let (db, runner) = runner_at(Some("1.0")).await;
    let log = EventLog::default();

    let summary = runner.run(text, &log).await.unwrap();

    assert!(!summary.is_success());
    let failed = summary.failure.as_ref().unwrap();
    assert_eq!(failed.version.as_str(), "2.0");
    assert_eq!(failed.failure.statement_index, Some(1));
    assert_eq!(summary.not_attempted, 1);
    assert_eq!(summary.final_version.as_str(), "1.1");

    assert_eq!(
        db.current_version().await.unwrap().as_deref(),
        Some("1.1")
    );
    assert!(db.relation_exists("suppliers").await.unwrap());
    assert!(!db.relation_exists("shipments").await.unwrap());
    assert!(!db.relation_exists("never_reached").await.unwrap());
    assert!(!log.events().contains(&"patch 3.0".to_string()));
    assert!(log.events().contains(&"failed 2.0".to_string()));

    // After fixing nothing, a rerun starts from 1.1 and fails at 2.0 again
    let rerun = runner.run(text, &SilentObserver).await.unwrap();
    assert_eq!(rerun.starting_version.as_str(), "1.1");
    assert!(rerun.applied.is_empty());
    assert_eq!(rerun.failure.unwrap().version.as_str(), "2.0");
}

#[tokio::test]
async fn test_latest_row_wins_for_eligibility() {
    // 2.0 recorded first, then 1.0: the current version is 1.0
    let (db, runner) = runner_at(Some("2.0")).await;
    db.append_version("1.0", "rolled forward by hand").await.unwrap();
    db.execute_batch("CREATE TABLE products (id INT, name VARCHAR);")
        .await
        .unwrap();

    let plan = runner.plan(PATCHES).await.unwrap();
    assert_eq!(plan.current_version.as_str(), "1.0");
    assert_eq!(versions(&plan.patches), vec!["1.1", "2.0"]);
}

#[tokio::test]
async fn test_malformed_version_in_file_aborts_before_executing() {
    let text = "###NEW_VERSION### Version=1\n###SQL###\nCREATE TABLE early (id INT);\n###END###\n\
                ###NEW_VERSION### Version=1..2\n###SQL###\nSELECT 1;\n###END###\n";
    let (db, runner) = runner_at(None).await;

    let err = runner.run(text, &SilentObserver).await.unwrap_err();
    assert!(matches!(err, MigrateError::Core(_)));
    assert!(!db.relation_exists("early").await.unwrap());
}

#[tokio::test]
async fn test_fresh_database_applies_everything() {
    let (db, runner) = runner_at(None).await;
    let summary = runner.run(PATCHES, &SilentObserver).await.unwrap();

    assert_eq!(summary.starting_version, Version::initial());
    assert_eq!(summary.applied.len(), 3);
    assert_eq!(db.query_count("SELECT * FROM products").await.unwrap(), 1);
}
