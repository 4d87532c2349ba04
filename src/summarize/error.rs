//! Error types for the summarization chain.

use thiserror::Error;

/// Errors surfaced while rendering prompts or calling the model provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    /// No provider API key was configured.
    #[error("summarization API key is required (set SHIPLOG_GROQ_API_KEY or GROQ_API_KEY)")]
    MissingApiKey,

    /// The HTTP client could not be configured.
    #[error("failed to configure summarization HTTP client: {message}")]
    Configuration {
        /// Error detail from the client builder.
        message: String,
    },

    /// A prompt template failed to render.
    #[error("prompt rendering failed: {message}")]
    Template {
        /// Error detail from the template engine.
        message: String,
    },

    /// The transport to the provider failed.
    #[error("summarization request transport failed: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The provider returned a non-success status.
    #[error("summarization request failed with status {status}: {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// The model output did not match the summary schema.
    #[error("model output did not match the summary schema: {message}")]
    MalformedResponse {
        /// What made the output unusable.
        message: String,
    },
}
