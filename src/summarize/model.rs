//! Domain models for changelog summarization.

use serde::{Deserialize, Serialize};

/// A structured changelog summary produced by the model.
///
/// This is the schema the output parser validates model responses against;
/// it doubles as the wire shape for pull request summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// A short, descriptive title for the change.
    pub name: String,
    /// A brief summary of the main changes and their purpose.
    pub description: String,
    /// Relevant one-word tags such as `fix` or `feature`.
    pub tags: Vec<String>,
}

impl SummaryRecord {
    /// Sentinel returned when there are no commits to summarize.
    #[must_use]
    pub fn no_changes() -> Self {
        Self {
            name: "No Changes".to_owned(),
            description: "No commits were provided for summarization.".to_owned(),
            tags: vec!["empty".to_owned()],
        }
    }

    /// Sentinel returned when there are no recently closed pull requests.
    #[must_use]
    pub fn no_recent_changes() -> Self {
        Self {
            name: "No Recent Changes".to_owned(),
            description: "No recently closed pull requests were found for summarization."
                .to_owned(),
            tags: Vec::new(),
        }
    }

    /// Sentinel substituted when the model call or output parsing fails.
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            name: "Error in Summarization".to_owned(),
            description: "An error occurred while trying to summarize the change. Please try \
                          again later or contact support if the problem persists."
                .to_owned(),
            tags: vec!["error".to_owned()],
        }
    }
}

/// Input for pull request summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInput {
    /// Pull request title.
    pub title: String,
    /// Pull request description.
    pub description: String,
}

/// Outcome of summarizing a single item.
///
/// Callers can tell a genuine summary from a placeholder: `Degraded` means
/// the model failed and the sentinel record is being shown instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The model produced a schema-valid summary.
    Generated(SummaryRecord),
    /// The model call failed and a sentinel record stands in.
    Degraded {
        /// The sentinel record shown to clients.
        record: SummaryRecord,
        /// Why the summary degraded.
        reason: String,
    },
}

impl SummaryOutcome {
    /// Constructs a degraded outcome with the standard sentinel record.
    #[must_use]
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded {
            record: SummaryRecord::degraded(),
            reason: reason.into(),
        }
    }

    /// Borrow the record regardless of outcome.
    #[must_use]
    pub const fn record(&self) -> &SummaryRecord {
        match self {
            Self::Generated(record) | Self::Degraded { record, .. } => record,
        }
    }

    /// Consume the outcome, keeping only the record.
    #[must_use]
    pub fn into_record(self) -> SummaryRecord {
        match self {
            Self::Generated(record) | Self::Degraded { record, .. } => record,
        }
    }

    /// Whether this outcome is a placeholder for a failed summary.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{SummaryOutcome, SummaryRecord};

    #[test]
    fn no_changes_sentinel_matches_contract() {
        let sentinel = SummaryRecord::no_changes();
        assert_eq!(sentinel.name, "No Changes");
        assert_eq!(sentinel.tags, vec!["empty".to_owned()]);
    }

    #[test]
    fn degraded_sentinel_is_tagged_error() {
        let sentinel = SummaryRecord::degraded();
        assert_eq!(sentinel.name, "Error in Summarization");
        assert_eq!(sentinel.tags, vec!["error".to_owned()]);
    }

    #[test]
    fn degraded_outcome_keeps_reason_and_sentinel() {
        let outcome = SummaryOutcome::degraded("model timed out");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.record().name, "Error in Summarization");
        let SummaryOutcome::Degraded { reason, .. } = outcome else {
            panic!("expected degraded outcome");
        };
        assert_eq!(reason, "model timed out");
    }
}
