//! LLM-backed changelog summarization.
//!
//! Two chains (commits, pull requests) pair fixed prompt templates with a
//! schema-validated output parser. A failed model call never fails the
//! request: each item degrades to a tagged sentinel outcome so callers can
//! distinguish placeholders from genuine summaries.

mod error;
mod groq;
mod model;
mod prompt;
mod service;

pub use error::SummaryError;
pub use groq::{GroqSummaryConfig, GroqSummaryService};
pub use model::{PullRequestInput, SummaryOutcome, SummaryRecord};
pub use service::{
    SUMMARY_BATCH_LIMIT, SummaryService, summarize_commits, summarize_pull_requests,
};

#[cfg(test)]
pub use service::MockSummaryService;
