//! Service abstraction and fallback helpers for summarization.

use async_trait::async_trait;

use super::error::SummaryError;
use super::model::{PullRequestInput, SummaryOutcome, SummaryRecord};

/// Only the most recent items are summarized per call; the batch size is a
/// fixed policy, not configuration.
pub const SUMMARY_BATCH_LIMIT: usize = 5;

/// Shared summarization contract used by the dashboard and changelog routes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Summarizes a single commit message.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError`] when the provider call or output parsing
    /// fails.
    async fn summarize_commit(&self, message: &str) -> Result<SummaryRecord, SummaryError>;

    /// Summarizes a single pull request.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError`] when the provider call or output parsing
    /// fails.
    async fn summarize_pull_request(
        &self,
        title: &str,
        description: &str,
    ) -> Result<SummaryRecord, SummaryError>;
}

/// Summarizes up to [`SUMMARY_BATCH_LIMIT`] commit messages, degrading each
/// failed item to a sentinel outcome.
///
/// Zero commits produce exactly one `No Changes` sentinel.
pub async fn summarize_commits(
    service: &dyn SummaryService,
    messages: &[String],
) -> Vec<SummaryOutcome> {
    if messages.is_empty() {
        tracing::warn!("no commits provided for summarization");
        return vec![SummaryOutcome::Generated(SummaryRecord::no_changes())];
    }

    let mut outcomes = Vec::with_capacity(messages.len().min(SUMMARY_BATCH_LIMIT));
    for message in messages.iter().take(SUMMARY_BATCH_LIMIT) {
        outcomes.push(summarize_one(service.summarize_commit(message).await));
    }
    outcomes
}

/// Summarizes up to [`SUMMARY_BATCH_LIMIT`] pull requests, degrading each
/// failed item to a sentinel outcome.
///
/// Zero pull requests produce exactly one `No Recent Changes` sentinel.
pub async fn summarize_pull_requests(
    service: &dyn SummaryService,
    pull_requests: &[PullRequestInput],
) -> Vec<SummaryOutcome> {
    if pull_requests.is_empty() {
        tracing::warn!("no closed pull requests found for summarization");
        return vec![SummaryOutcome::Generated(SummaryRecord::no_recent_changes())];
    }

    let mut outcomes = Vec::with_capacity(pull_requests.len().min(SUMMARY_BATCH_LIMIT));
    for pull_request in pull_requests.iter().take(SUMMARY_BATCH_LIMIT) {
        outcomes.push(summarize_one(
            service
                .summarize_pull_request(&pull_request.title, &pull_request.description)
                .await,
        ));
    }
    outcomes
}

fn summarize_one(result: Result<SummaryRecord, SummaryError>) -> SummaryOutcome {
    match result {
        Ok(record) => SummaryOutcome::Generated(record),
        Err(error) => {
            tracing::warn!(error = %error, "summarization degraded to sentinel record");
            SummaryOutcome::degraded(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MockSummaryService, SUMMARY_BATCH_LIMIT, summarize_commits, summarize_pull_requests,
    };
    use crate::summarize::error::SummaryError;
    use crate::summarize::model::{PullRequestInput, SummaryRecord};

    fn sample_record(name: &str) -> SummaryRecord {
        SummaryRecord {
            name: name.to_owned(),
            description: "A change.".to_owned(),
            tags: vec!["feature".to_owned()],
        }
    }

    #[tokio::test]
    async fn zero_commits_yield_exactly_one_no_changes_sentinel() {
        let service = MockSummaryService::new();

        let outcomes = summarize_commits(&service, &[]).await;

        assert_eq!(outcomes.len(), 1);
        let outcome = outcomes.first().expect("should have sentinel outcome");
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.record().name, "No Changes");
        assert_eq!(outcome.record().tags, vec!["empty".to_owned()]);
    }

    #[tokio::test]
    async fn zero_pull_requests_yield_no_recent_changes_sentinel() {
        let service = MockSummaryService::new();

        let outcomes = summarize_pull_requests(&service, &[]).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes.first().expect("should have outcome").record().name,
            "No Recent Changes"
        );
    }

    #[tokio::test]
    async fn failed_items_degrade_to_sentinel_records() {
        let mut service = MockSummaryService::new();
        service
            .expect_summarize_commit()
            .returning(|message| {
                if message.contains("bad") {
                    Err(SummaryError::MalformedResponse {
                        message: "not json".to_owned(),
                    })
                } else {
                    Ok(SummaryRecord {
                        name: "Good".to_owned(),
                        description: "Fine.".to_owned(),
                        tags: vec![],
                    })
                }
            });

        let outcomes =
            summarize_commits(&service, &["good commit".to_owned(), "bad commit".to_owned()])
                .await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes.first().expect("first outcome").is_degraded());
        let degraded = outcomes.get(1).expect("second outcome");
        assert!(degraded.is_degraded());
        assert_eq!(degraded.record().tags, vec!["error".to_owned()]);
    }

    #[tokio::test]
    async fn batches_are_capped_at_five_items() {
        let mut service = MockSummaryService::new();
        service
            .expect_summarize_commit()
            .times(SUMMARY_BATCH_LIMIT)
            .returning(|_| {
                Ok(SummaryRecord {
                    name: "Change".to_owned(),
                    description: "Described.".to_owned(),
                    tags: vec![],
                })
            });

        let messages: Vec<String> = (0..8).map(|index| format!("commit {index}")).collect();
        let outcomes = summarize_commits(&service, &messages).await;

        assert_eq!(outcomes.len(), SUMMARY_BATCH_LIMIT);
    }

    #[tokio::test]
    async fn pull_request_inputs_are_forwarded() {
        let mut service = MockSummaryService::new();
        service
            .expect_summarize_pull_request()
            .withf(|title, description| title == "Add caching" && description.contains("hour"))
            .returning(|_, _| Ok(sample_record("Add caching")));

        let outcomes = summarize_pull_requests(
            &service,
            &[PullRequestInput {
                title: "Add caching".to_owned(),
                description: "Caches responses for an hour.".to_owned(),
            }],
        )
        .await;

        assert_eq!(
            outcomes.first().expect("should have outcome").record().name,
            "Add caching"
        );
    }
}
