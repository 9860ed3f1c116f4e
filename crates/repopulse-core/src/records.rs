//! Typed views over the raw records returned by the GitHub REST API.
//!
//! The API hands back arbitrary nested JSON. Each record is converted field by
//! field: a field that is absent, `null`, or of the wrong type becomes `None`,
//! and conversion of a record never fails. Whether a record is usable is
//! decided later by the analyzer that consumes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A commit as listed by `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// `commit.author.name`
    pub author_name: Option<String>,
    /// `commit.author.date`, still unparsed.
    pub author_date: Option<String>,
}

/// A pull request as listed by `GET /repos/{owner}/{repo}/pulls?state=all`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub state: Option<String>,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
}

/// An entry from `GET /repos/{owner}/{repo}/issues?state=all`.
///
/// That endpoint also returns pull requests; those carry a `pull_request`
/// object and are flagged with `is_pull_request`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub state: Option<String>,
    pub created_at: Option<String>,
    pub closed_at: Option<String>,
    #[serde(default)]
    pub is_pull_request: bool,
}

/// A contributor entry. Not used by any metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub login: Option<String>,
    pub contributions: Option<u64>,
}

impl CommitRecord {
    pub fn new(author_name: impl Into<String>, author_date: impl Into<String>) -> Self {
        Self {
            author_name: Some(author_name.into()),
            author_date: Some(author_date.into()),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let author = value.get("commit").and_then(|c| c.get("author"));
        Self {
            author_name: author
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            author_date: author.and_then(|a| string_field(a, "date")),
        }
    }
}

impl PullRequestRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            state: string_field(value, "state"),
            created_at: string_field(value, "created_at"),
            merged_at: string_field(value, "merged_at"),
        }
    }

    /// A truthy `merged_at` means merged; the timestamp need not parse.
    pub fn is_merged(&self) -> bool {
        is_present(&self.merged_at)
    }
}

impl IssueRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            state: string_field(value, "state"),
            created_at: string_field(value, "created_at"),
            closed_at: string_field(value, "closed_at"),
            is_pull_request: value.get("pull_request").is_some_and(is_truthy),
        }
    }
}

impl ContributorRecord {
    pub fn from_value(value: &Value) -> Self {
        Self {
            login: string_field(value, "login"),
            contributions: value.get("contributions").and_then(Value::as_u64),
        }
    }
}

pub fn commits_from_values(values: &[Value]) -> Vec<CommitRecord> {
    values.iter().map(CommitRecord::from_value).collect()
}

pub fn pull_requests_from_values(values: &[Value]) -> Vec<PullRequestRecord> {
    values.iter().map(PullRequestRecord::from_value).collect()
}

pub fn issues_from_values(values: &[Value]) -> Vec<IssueRecord> {
    values.iter().map(IssueRecord::from_value).collect()
}

pub fn contributors_from_values(values: &[Value]) -> Vec<ContributorRecord> {
    values.iter().map(ContributorRecord::from_value).collect()
}

/// Non-empty string field, or `None`.
///
/// Author names bypass this: an empty name is still an author.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commit_from_nested_author() {
        let value = json!({
            "sha": "abc123",
            "commit": {
                "author": { "name": "alice", "email": "a@example.com", "date": "2024-01-01T00:00:00Z" },
                "message": "init"
            }
        });
        let record = CommitRecord::from_value(&value);
        assert_eq!(record.author_name.as_deref(), Some("alice"));
        assert_eq!(record.author_date.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_commit_missing_nested_fields() {
        assert_eq!(CommitRecord::from_value(&json!({})), CommitRecord::default());
        assert_eq!(
            CommitRecord::from_value(&json!({ "commit": { "author": null } })),
            CommitRecord::default()
        );

        let wrong_type = CommitRecord::from_value(&json!({
            "commit": { "author": { "name": 42, "date": "2024-01-01T00:00:00Z" } }
        }));
        assert!(wrong_type.author_name.is_none());
        assert!(wrong_type.author_date.is_some());
    }

    #[test]
    fn test_commit_empty_author_name_is_kept() {
        let record = CommitRecord::from_value(&json!({
            "commit": { "author": { "name": "", "date": "2024-01-01T00:00:00Z" } }
        }));
        assert_eq!(record.author_name.as_deref(), Some(""));
    }

    #[test]
    fn test_pull_request_merged_presence() {
        let merged = PullRequestRecord::from_value(&json!({
            "state": "closed",
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": "not-a-date"
        }));
        assert!(merged.is_merged());

        let unmerged = PullRequestRecord::from_value(&json!({
            "state": "closed",
            "created_at": "2024-01-01T00:00:00Z",
            "merged_at": null
        }));
        assert!(!unmerged.is_merged());
        assert_eq!(unmerged.state.as_deref(), Some("closed"));
    }

    #[test]
    fn test_issue_pull_request_marker() {
        let pr_shaped = IssueRecord::from_value(&json!({
            "state": "open",
            "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/1" }
        }));
        assert!(pr_shaped.is_pull_request);

        let null_marker = IssueRecord::from_value(&json!({ "state": "open", "pull_request": null }));
        assert!(!null_marker.is_pull_request);

        let empty_marker = IssueRecord::from_value(&json!({ "state": "open", "pull_request": {} }));
        assert!(!empty_marker.is_pull_request);

        let plain = IssueRecord::from_value(&json!({ "state": "closed" }));
        assert!(!plain.is_pull_request);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!({ "url": "u" })));
    }

    #[test]
    fn test_contributor_from_value() {
        let record = ContributorRecord::from_value(&json!({ "login": "bob", "contributions": 12 }));
        assert_eq!(record.login.as_deref(), Some("bob"));
        assert_eq!(record.contributions, Some(12));
    }
}
