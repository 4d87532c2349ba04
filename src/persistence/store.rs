//! `SQLite`-backed store for users, repos, commits, pull requests, and
//! generated summaries.
//!
//! Writes keyed by natural identifiers use `INSERT ... ON CONFLICT DO
//! NOTHING`, so re-fetched rows never clobber existing data and concurrent
//! requests racing past an existing-rows check cannot produce duplicate
//! sets. Each operation opens its own connection; the handle itself is a
//! cheap clone of the database URL.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::Connection;
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;
use serde::Serialize;

use super::PersistenceError;
use super::migrator::enable_foreign_keys;

const USERS_TABLE: &str = "users";

/// A stored dashboard user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Internal user id.
    pub id: i64,
    /// Opaque GitHub access token captured during the OAuth callback.
    pub github_token: String,
}

/// A stored repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    /// Internal repository id.
    pub id: i64,
    /// The `owner/name` form.
    pub full_name: String,
}

/// A commit to insert, as mapped from the upstream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    /// Commit SHA (natural key).
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Commit author name.
    pub author: String,
    /// Author timestamp.
    pub date: DateTime<Utc>,
    /// The `owner/name` form of the repository.
    pub repo_full_name: String,
}

/// A stored commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCommit {
    /// Commit SHA.
    pub sha: String,
    /// Full commit message.
    pub message: String,
    /// Commit author name.
    pub author: String,
    /// Author timestamp.
    pub date: DateTime<Utc>,
    /// The `owner/name` form of the repository.
    pub repo_full_name: String,
}

/// A pull request to insert, as mapped from the upstream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Pull request title.
    pub title: String,
    /// Pull request description; upstream bodies may be empty.
    pub description: String,
    /// When the pull request was closed, if known.
    pub closed_at: Option<DateTime<Utc>>,
}

/// A stored pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPullRequest {
    /// Internal row id.
    pub id: i64,
    /// Pull request title.
    pub title: String,
    /// Pull request description.
    pub description: String,
    /// When the pull request was closed, if known.
    pub closed_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// A summary record to insert as part of a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommitSummary {
    /// Short descriptive title.
    pub name: String,
    /// Brief summary of the changes.
    pub description: String,
    /// Tags describing the nature of the change.
    pub tags: Vec<String>,
}

/// A stored summary record, serialisable straight into API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredCommitSummary {
    /// Internal row id.
    pub id: i64,
    /// The `owner/name` form of the repository.
    #[serde(rename = "repoFullName")]
    pub repo_full_name: String,
    /// Position of this record within its summary set.
    #[serde(skip_serializing)]
    pub item_index: i64,
    /// Short descriptive title.
    pub name: String,
    /// Brief summary of the changes.
    pub description: String,
    /// Tags describing the nature of the change.
    pub tags: Vec<String>,
    /// When the set was generated.
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

/// `SQLite`-backed store handle.
#[derive(Debug, Clone)]
pub struct Store {
    database_url: String,
}

impl Store {
    /// Creates a store targeting the configured `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Inserts a user created during the OAuth callback.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the insert fails.
    pub fn create_user(&self, github_token: &str) -> Result<UserRecord, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct IdRow {
            #[diesel(sql_type = BigInt)]
            id: i64,
        }

        let mut connection = self.establish_connection()?;

        sql_query("INSERT INTO users (github_token, created_at) VALUES (?, ?);")
            .bind::<Text, _>(github_token)
            .bind::<Text, _>(format_timestamp(Utc::now()))
            .execute(&mut connection)
            .map(drop)
            .map_err(|error| Self::map_write_error(&mut connection, &error))?;

        let row: IdRow = sql_query("SELECT last_insert_rowid() AS id;")
            .get_result(&mut connection)
            .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        Ok(UserRecord {
            id: row.id,
            github_token: github_token.to_owned(),
        })
    }

    /// Looks up a user by internal id.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn find_user(&self, id: i64) -> Result<Option<UserRecord>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            id: i64,
            #[diesel(sql_type = Text)]
            github_token: String,
        }

        let mut connection = self.establish_connection()?;

        let result: Option<Row> =
            sql_query("SELECT id, github_token FROM users WHERE id = ? LIMIT 1;")
                .bind::<BigInt, _>(id)
                .get_result(&mut connection)
                .optional()
                .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        Ok(result.map(|row| UserRecord {
            id: row.id,
            github_token: row.github_token,
        }))
    }

    /// Finds the repository row for `full_name`, creating it on first
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the insert or lookup fails.
    pub fn find_or_create_repo(&self, full_name: &str) -> Result<RepoRecord, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            id: i64,
            #[diesel(sql_type = Text)]
            full_name: String,
        }

        let mut connection = self.establish_connection()?;

        sql_query(
            "INSERT INTO repos (full_name, created_at) VALUES (?, ?) \
             ON CONFLICT (full_name) DO NOTHING;",
        )
        .bind::<Text, _>(full_name)
        .bind::<Text, _>(format_timestamp(Utc::now()))
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::map_write_error(&mut connection, &error))?;

        let result: Option<Row> =
            sql_query("SELECT id, full_name FROM repos WHERE full_name = ? LIMIT 1;")
                .bind::<Text, _>(full_name)
                .get_result(&mut connection)
                .optional()
                .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        let Some(row) = result else {
            return Err(PersistenceError::WriteFailed {
                message: format!("repo row for {full_name} missing after insert"),
            });
        };

        Ok(RepoRecord {
            id: row.id,
            full_name: row.full_name,
        })
    }

    /// Inserts fetched commits, skipping SHAs that already exist.
    ///
    /// The batch runs in one transaction; a failing item fails the whole
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when any insert fails.
    pub fn insert_commits(&self, commits: &[NewCommit]) -> Result<(), PersistenceError> {
        let mut connection = self.establish_connection()?;

        let result = connection.transaction::<_, diesel::result::Error, _>(|inner| {
            for commit in commits {
                sql_query(
                    "INSERT INTO commits (sha, message, author, date, repo_full_name) \
                     VALUES (?, ?, ?, ?, ?) ON CONFLICT (sha) DO NOTHING;",
                )
                .bind::<Text, _>(&commit.sha)
                .bind::<Text, _>(&commit.message)
                .bind::<Text, _>(&commit.author)
                .bind::<Text, _>(format_timestamp(commit.date))
                .bind::<Text, _>(&commit.repo_full_name)
                .execute(inner)?;
            }
            Ok(())
        });

        result.map_err(|error| Self::map_write_error(&mut connection, &error))
    }

    /// Lists stored commits for a repository, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails or a stored
    /// timestamp cannot be parsed.
    pub fn commits_for_repo(
        &self,
        repo_full_name: &str,
        limit: i64,
    ) -> Result<Vec<StoredCommit>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = Text)]
            sha: String,
            #[diesel(sql_type = Text)]
            message: String,
            #[diesel(sql_type = Text)]
            author: String,
            #[diesel(sql_type = Text)]
            date: String,
            #[diesel(sql_type = Text)]
            repo_full_name: String,
        }

        let mut connection = self.establish_connection()?;

        let rows: Vec<Row> = sql_query(
            "SELECT sha, message, author, date, repo_full_name FROM commits \
             WHERE repo_full_name = ? ORDER BY date ASC LIMIT ?;",
        )
        .bind::<Text, _>(repo_full_name)
        .bind::<BigInt, _>(limit)
        .get_results(&mut connection)
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        rows.into_iter()
            .map(|row| {
                Ok(StoredCommit {
                    sha: row.sha,
                    message: row.message,
                    author: row.author,
                    date: parse_timestamp(&row.date)?,
                    repo_full_name: row.repo_full_name,
                })
            })
            .collect()
    }

    /// Lists pull requests for a repository created after `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn recent_pull_requests(
        &self,
        repo_id: i64,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<StoredPullRequest>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let rows: Vec<PullRequestRow> = sql_query(
            "SELECT id, title, description, closed_at, created_at FROM pull_requests \
             WHERE repo_id = ? AND created_at >= ? ORDER BY id ASC;",
        )
        .bind::<BigInt, _>(repo_id)
        .bind::<Text, _>(format_timestamp(cutoff))
        .get_results(&mut connection)
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        rows.into_iter().map(PullRequestRow::into_stored).collect()
    }

    /// Lists the first `limit` stored pull requests of a repository in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    pub fn pull_requests_for_repo(
        &self,
        repo_id: i64,
        limit: i64,
    ) -> Result<Vec<StoredPullRequest>, PersistenceError> {
        let mut connection = self.establish_connection()?;

        let rows: Vec<PullRequestRow> = sql_query(
            "SELECT id, title, description, closed_at, created_at FROM pull_requests \
             WHERE repo_id = ? ORDER BY id ASC LIMIT ?;",
        )
        .bind::<BigInt, _>(repo_id)
        .bind::<BigInt, _>(limit)
        .get_results(&mut connection)
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        rows.into_iter().map(PullRequestRow::into_stored).collect()
    }

    /// Inserts pull requests fetched from upstream for a repository.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when any insert fails.
    pub fn insert_pull_requests(
        &self,
        repo_id: i64,
        pull_requests: &[NewPullRequest],
    ) -> Result<(), PersistenceError> {
        let mut connection = self.establish_connection()?;
        let created_at = format_timestamp(Utc::now());

        let result = connection.transaction::<_, diesel::result::Error, _>(|inner| {
            for pull_request in pull_requests {
                sql_query(
                    "INSERT INTO pull_requests (title, description, repo_id, closed_at, \
                     created_at) VALUES (?, ?, ?, ?, ?);",
                )
                .bind::<Text, _>(&pull_request.title)
                .bind::<Text, _>(&pull_request.description)
                .bind::<BigInt, _>(repo_id)
                .bind::<Nullable<Text>, _>(pull_request.closed_at.map(format_timestamp))
                .bind::<Text, _>(&created_at)
                .execute(inner)?;
            }
            Ok(())
        });

        result.map_err(|error| Self::map_write_error(&mut connection, &error))
    }

    /// Lists the stored summary set of a repository in item order.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails or a stored row
    /// cannot be decoded.
    pub fn summaries_for_repo(
        &self,
        repo_full_name: &str,
    ) -> Result<Vec<StoredCommitSummary>, PersistenceError> {
        let mut connection = self.establish_connection()?;
        Self::read_summaries(&mut connection, repo_full_name)
    }

    /// Inserts a summary set for a repository and returns the stored set.
    ///
    /// The unique `(repo_full_name, item_index)` constraint makes this a
    /// conditional insert: when two requests race, the first writer wins
    /// and both observe the same stored set.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when serialisation or any insert fails.
    pub fn insert_summary_set(
        &self,
        repo_full_name: &str,
        records: &[NewCommitSummary],
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<StoredCommitSummary>, PersistenceError> {
        let mut serialised = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let tags_json =
                serde_json::to_string(&record.tags).map_err(|error| {
                    PersistenceError::WriteFailed {
                        message: format!("tags serialisation failed: {error}"),
                    }
                })?;
            serialised.push((i64::try_from(index).unwrap_or(i64::MAX), record, tags_json));
        }

        let mut connection = self.establish_connection()?;
        let generated_at_text = format_timestamp(generated_at);

        let result = connection.transaction::<_, diesel::result::Error, _>(|inner| {
            for (item_index, record, tags_json) in &serialised {
                sql_query(
                    "INSERT INTO commit_summaries (repo_full_name, item_index, name, \
                     description, tags, generated_at) VALUES (?, ?, ?, ?, ?, ?) \
                     ON CONFLICT (repo_full_name, item_index) DO NOTHING;",
                )
                .bind::<Text, _>(repo_full_name)
                .bind::<BigInt, _>(*item_index)
                .bind::<Text, _>(&record.name)
                .bind::<Text, _>(&record.description)
                .bind::<Text, _>(tags_json)
                .bind::<Text, _>(&generated_at_text)
                .execute(inner)?;
            }
            Ok(())
        });

        result.map_err(|error| Self::map_write_error(&mut connection, &error))?;

        Self::read_summaries(&mut connection, repo_full_name)
    }

    fn read_summaries(
        connection: &mut SqliteConnection,
        repo_full_name: &str,
    ) -> Result<Vec<StoredCommitSummary>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            id: i64,
            #[diesel(sql_type = Text)]
            repo_full_name: String,
            #[diesel(sql_type = BigInt)]
            item_index: i64,
            #[diesel(sql_type = Text)]
            name: String,
            #[diesel(sql_type = Text)]
            description: String,
            #[diesel(sql_type = Text)]
            tags: String,
            #[diesel(sql_type = Text)]
            generated_at: String,
        }

        let rows: Vec<Row> = sql_query(
            "SELECT id, repo_full_name, item_index, name, description, tags, generated_at \
             FROM commit_summaries WHERE repo_full_name = ? ORDER BY item_index ASC;",
        )
        .bind::<Text, _>(repo_full_name)
        .get_results(&mut *connection)
        .map_err(|error| Self::map_query_error(connection, &error))?;

        rows.into_iter()
            .map(|row| {
                let tags: Vec<String> = serde_json::from_str(&row.tags).map_err(|error| {
                    PersistenceError::QueryFailed {
                        message: format!("tags decoding failed: {error}"),
                    }
                })?;
                Ok(StoredCommitSummary {
                    id: row.id,
                    repo_full_name: row.repo_full_name,
                    item_index: row.item_index,
                    name: row.name,
                    description: row.description,
                    tags,
                    generated_at: parse_timestamp(&row.generated_at)?,
                })
            })
            .collect()
    }

    fn establish_connection(&self) -> Result<SqliteConnection, PersistenceError> {
        let mut connection = SqliteConnection::establish(&self.database_url).map_err(|error| {
            PersistenceError::ConnectionFailed {
                message: error.to_string(),
            }
        })?;

        enable_foreign_keys(&mut connection)?;

        Ok(connection)
    }

    fn schema_table_exists(
        connection: &mut SqliteConnection,
    ) -> Result<bool, diesel::result::Error> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            count: i64,
        }

        let row: Row = sql_query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?;",
        )
        .bind::<Text, _>(USERS_TABLE)
        .get_result(connection)?;

        Ok(row.count > 0)
    }

    fn map_error_with_schema_check<F>(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
        create_error: F,
    ) -> PersistenceError
    where
        F: Fn(String) -> PersistenceError,
    {
        match Self::schema_table_exists(connection) {
            Ok(false) => PersistenceError::SchemaNotInitialised,
            Ok(true) => create_error(error.to_string()),
            Err(check_error) => create_error(format!(
                "schema presence check failed: {check_error}; original error: {error}"
            )),
        }
    }

    fn map_query_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::QueryFailed { message }
        })
    }

    fn map_write_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::WriteFailed { message }
        })
    }
}

#[derive(Debug, QueryableByName)]
struct PullRequestRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = Text)]
    description: String,
    #[diesel(sql_type = Nullable<Text>)]
    closed_at: Option<String>,
    #[diesel(sql_type = Text)]
    created_at: String,
}

impl PullRequestRow {
    fn into_stored(self) -> Result<StoredPullRequest, PersistenceError> {
        Ok(StoredPullRequest {
            id: self.id,
            title: self.title,
            description: self.description,
            closed_at: self.closed_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| PersistenceError::QueryFailed {
            message: format!("invalid stored timestamp '{value}': {error}"),
        })
}

#[cfg(test)]
mod tests;
