//! Shiplog library crate: a GitHub changelog dashboard service.
//!
//! Shiplog authenticates users against GitHub via OAuth, lists their
//! repositories, fetches commits and closed pull requests, and produces
//! human-readable changelog summaries through an LLM chain. Redis acts as
//! a read-through cache in front of both the GitHub API and the `SQLite`
//! store.

pub mod cache;
pub mod config;
pub mod github;
pub mod persistence;
pub mod server;
pub mod summarize;
pub mod telemetry;

pub use config::{ConfigError, ShiplogConfig};
pub use github::{AccessToken, GithubError, OctocrabGithubGateway, RepositoryLocator};
pub use persistence::{PersistenceError, Store, migrate_database};
pub use server::{AppState, ServeError, ServerOptions, serve};
pub use summarize::{GroqSummaryConfig, GroqSummaryService, SummaryOutcome, SummaryRecord};
