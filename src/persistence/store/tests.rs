//! Store tests against a migrated temporary database.

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use crate::persistence::{NewCommit, NewCommitSummary, NewPullRequest, PersistenceError, Store};
use crate::telemetry::NoopTelemetrySink;

fn migrated_store() -> (TempDir, Store) {
    let directory = TempDir::new().expect("temporary directory should be created");
    let database_path = directory.path().join("shiplog.sqlite");
    let database_url = database_path.to_string_lossy().into_owned();

    crate::persistence::migrate_database(&database_url, &NoopTelemetrySink)
        .expect("migration should succeed");

    let store = Store::new(database_url).expect("store should build");
    (directory, store)
}

fn sample_commit(sha: &str, date_offset_hours: i64) -> NewCommit {
    NewCommit {
        sha: sha.to_owned(),
        message: format!("commit {sha}"),
        author: "Ada".to_owned(),
        date: Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
            + Duration::hours(date_offset_hours),
        repo_full_name: "octocat/hello-world".to_owned(),
    }
}

#[test]
fn create_user_then_find_round_trips() {
    let (_directory, store) = migrated_store();

    let created = store.create_user("gho_token").expect("create should succeed");
    let found = store
        .find_user(created.id)
        .expect("find should succeed")
        .expect("user should exist");

    assert_eq!(found, created);
    assert_eq!(found.github_token, "gho_token");
}

#[test]
fn find_user_returns_none_for_unknown_id() {
    let (_directory, store) = migrated_store();
    let found = store.find_user(404).expect("find should succeed");
    assert!(found.is_none());
}

#[test]
fn find_or_create_repo_is_idempotent() {
    let (_directory, store) = migrated_store();

    let first = store
        .find_or_create_repo("octocat/hello-world")
        .expect("first call should succeed");
    let second = store
        .find_or_create_repo("octocat/hello-world")
        .expect("second call should succeed");

    assert_eq!(first.id, second.id);
    assert_eq!(second.full_name, "octocat/hello-world");
}

#[test]
fn insert_commits_skips_existing_shas() {
    let (_directory, store) = migrated_store();

    let original = sample_commit("abc", 0);
    store
        .insert_commits(std::slice::from_ref(&original))
        .expect("insert should succeed");

    let mut duplicate = sample_commit("abc", 0);
    duplicate.message = "rewritten".to_owned();
    store
        .insert_commits(&[duplicate, sample_commit("def", 1)])
        .expect("insert should succeed");

    let stored = store
        .commits_for_repo("octocat/hello-world", 5)
        .expect("query should succeed");

    assert_eq!(stored.len(), 2);
    let first = stored.first().expect("should have first commit");
    // The conflicting insert is a no-op, so the original message survives.
    assert_eq!(first.message, "commit abc");
}

#[test]
fn commits_for_repo_orders_by_date_and_caps() {
    let (_directory, store) = migrated_store();

    store
        .insert_commits(&[
            sample_commit("c3", 3),
            sample_commit("c1", 1),
            sample_commit("c2", 2),
        ])
        .expect("insert should succeed");

    let stored = store
        .commits_for_repo("octocat/hello-world", 2)
        .expect("query should succeed");

    let shas: Vec<&str> = stored.iter().map(|commit| commit.sha.as_str()).collect();
    assert_eq!(shas, vec!["c1", "c2"]);
}

#[test]
fn recent_pull_requests_filters_by_cutoff() {
    let (_directory, store) = migrated_store();
    let repo = store
        .find_or_create_repo("octocat/hello-world")
        .expect("repo should be created");

    store
        .insert_pull_requests(
            repo.id,
            &[NewPullRequest {
                title: "Add feature".to_owned(),
                description: "Adds the feature.".to_owned(),
                closed_at: Some(Utc::now()),
            }],
        )
        .expect("insert should succeed");

    let recent = store
        .recent_pull_requests(repo.id, Utc::now() - Duration::hours(24))
        .expect("query should succeed");
    assert_eq!(recent.len(), 1);
    assert_eq!(
        recent.first().expect("should have row").title,
        "Add feature"
    );

    let future_cutoff = store
        .recent_pull_requests(repo.id, Utc::now() + Duration::hours(1))
        .expect("query should succeed");
    assert!(future_cutoff.is_empty());
}

#[test]
fn summary_set_insert_is_first_writer_wins() {
    let (_directory, store) = migrated_store();

    let first_set = vec![
        NewCommitSummary {
            name: "Add pagination".to_owned(),
            description: "Adds paging to the commit list.".to_owned(),
            tags: vec!["feature".to_owned()],
        },
        NewCommitSummary {
            name: "Fix off-by-one".to_owned(),
            description: "Corrects the page boundary.".to_owned(),
            tags: vec!["fix".to_owned()],
        },
    ];
    let generated_at = Utc::now();

    let stored_first = store
        .insert_summary_set("octocat/hello-world", &first_set, generated_at)
        .expect("insert should succeed");
    assert_eq!(stored_first.len(), 2);

    let second_set = vec![NewCommitSummary {
        name: "Completely different".to_owned(),
        description: "Should not replace the stored set.".to_owned(),
        tags: vec!["error".to_owned()],
    }];
    let stored_second = store
        .insert_summary_set("octocat/hello-world", &second_set, Utc::now())
        .expect("insert should succeed");

    // The racing writer observes the winner's rows, not its own.
    assert_eq!(stored_second, stored_first);
    let names: Vec<&str> = stored_second
        .iter()
        .map(|summary| summary.name.as_str())
        .collect();
    assert_eq!(names, vec!["Add pagination", "Fix off-by-one"]);
    assert_eq!(
        stored_second.first().expect("should have row").tags,
        vec!["feature".to_owned()]
    );
}

#[test]
fn queries_against_unmigrated_database_report_missing_schema() {
    let directory = TempDir::new().expect("temporary directory should be created");
    let database_path = directory.path().join("empty.sqlite");
    let store =
        Store::new(database_path.to_string_lossy().into_owned()).expect("store should build");

    let error = store.find_user(1).expect_err("query should fail");
    assert_eq!(error, PersistenceError::SchemaNotInitialised);
}

#[test]
fn blank_database_url_is_rejected() {
    let error = Store::new("  ").expect_err("blank URL should fail");
    assert_eq!(error, PersistenceError::BlankDatabaseUrl);
}
