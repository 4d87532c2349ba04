//! Prompt templates and schema-validated output parsing.
//!
//! Each chain pairs a fixed prompt template with format instructions that
//! describe the required JSON shape, then validates the model response
//! against [`SummaryRecord`]. Models occasionally wrap their JSON in a
//! fenced block or prose; the parser tolerates that and extracts the first
//! object it can find.

use minijinja::{Environment, context};

use super::error::SummaryError;
use super::model::SummaryRecord;

/// System prompt for the commit summarization chain.
pub(super) const COMMIT_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes \
     individual git commit messages. Provide a summary in the specified format.";

/// System prompt for the pull request summarization chain.
pub(super) const PULL_REQUEST_SYSTEM_PROMPT: &str = "You are a helpful assistant that \
     summarizes individual pull requests. Provide a succinct summary with a clear title, a \
     brief description of the main changes, and relevant tags. Tags depict the nature of the \
     change in one word, like fix, issue, feature, or enhancement.";

const COMMIT_USER_TEMPLATE: &str =
    "Summarize this commit:\n{{ commit }}\n\n{{ format_instructions }}";

const PULL_REQUEST_USER_TEMPLATE: &str = "Summarize this pull request: Title: {{ title }} \
     Description: {{ description }} {{ format_instructions }}";

const FORMAT_INSTRUCTIONS: &str = "Respond with a JSON object containing exactly these \
     fields: \"name\" (a short, descriptive title for the change), \"description\" (a brief \
     summary of the main changes and their purpose), and \"tags\" (an array of relevant \
     one-word tags). Output the JSON object only, with no surrounding prose.";

/// Renders the user prompt for a commit message.
pub(super) fn render_commit_prompt(message: &str) -> Result<String, SummaryError> {
    render(
        COMMIT_USER_TEMPLATE,
        context! { commit => message, format_instructions => FORMAT_INSTRUCTIONS },
    )
}

/// Renders the user prompt for a pull request.
pub(super) fn render_pull_request_prompt(
    title: &str,
    description: &str,
) -> Result<String, SummaryError> {
    render(
        PULL_REQUEST_USER_TEMPLATE,
        context! {
            title => title,
            description => description,
            format_instructions => FORMAT_INSTRUCTIONS,
        },
    )
}

/// Parses and validates a model response against the summary schema.
pub(super) fn parse_summary_record(raw: &str) -> Result<SummaryRecord, SummaryError> {
    let Some(json_object) = extract_json_object(raw) else {
        return Err(SummaryError::MalformedResponse {
            message: "no JSON object found in model output".to_owned(),
        });
    };

    let record: SummaryRecord =
        serde_json::from_str(json_object).map_err(|error| SummaryError::MalformedResponse {
            message: error.to_string(),
        })?;

    if record.name.trim().is_empty() {
        return Err(SummaryError::MalformedResponse {
            message: "summary name is empty".to_owned(),
        });
    }
    if record.description.trim().is_empty() {
        return Err(SummaryError::MalformedResponse {
            message: "summary description is empty".to_owned(),
        });
    }

    Ok(record)
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    raw.get(start..=end)
}

fn render(template_source: &str, values: minijinja::Value) -> Result<String, SummaryError> {
    let mut environment = Environment::new();
    environment.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    environment
        .add_template("prompt", template_source)
        .map_err(|error| SummaryError::Template {
            message: error.to_string(),
        })?;

    let template =
        environment
            .get_template("prompt")
            .map_err(|error| SummaryError::Template {
                message: error.to_string(),
            })?;

    template.render(values).map_err(|error| SummaryError::Template {
        message: error.to_string(),
    })
}
