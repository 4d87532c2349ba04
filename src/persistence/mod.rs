//! Persistence and database migrations.
//!
//! Shiplog stores users, repos, commits, pull requests, and generated
//! summaries in a `SQLite` database. The schema is managed with Diesel
//! migrations so the database can be created and upgraded consistently
//! across deployments.

mod error;
mod migrator;
mod store;

pub use error::PersistenceError;
pub use migrator::{INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database};
pub use store::{
    NewCommit, NewCommitSummary, NewPullRequest, RepoRecord, Store, StoredCommit,
    StoredCommitSummary, StoredPullRequest, UserRecord,
};
