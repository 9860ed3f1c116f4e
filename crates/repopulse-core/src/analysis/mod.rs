pub mod commits;
pub mod issues;
pub mod pull_requests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use commits::analyze_commits;
pub use issues::analyze_issues;
pub use pull_requests::analyze_pull_requests;

/// Commit volume, authorship, and cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitMetrics {
    pub total_commits: usize,
    pub unique_authors: usize,
    /// Author name to commit count. Iteration order carries no meaning.
    pub commits_per_author: BTreeMap<String, usize>,
    pub commit_frequency_per_week: f64,
}

/// Pull request counts by state, merge rate, and merge latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PRMetrics {
    pub total_pull_requests: usize,
    pub merged_prs: usize,
    pub open_prs: usize,
    pub closed_prs: usize,
    /// Percentage of pull requests merged, 0-100.
    pub merge_rate: f64,
    pub avg_merge_time_hours: f64,
}

/// Issue counts by state, resolution rate, and resolution latency.
///
/// Pull requests surfaced by the issues endpoint are never counted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMetrics {
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    /// Percentage of issues closed, 0-100.
    pub resolution_rate: f64,
    pub avg_resolution_time_hours: f64,
}

/// Percentage of `part` in `total`, rounded to two decimals. Zero when `total` is zero.
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    crate::timestamp::round2(part as f64 / total as f64 * 100.0)
}

/// Arithmetic mean, zero for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Serializes an absent metrics block as `{}` and reads `{}` back as `None`.
pub(crate) mod empty_object {
    use serde::de::DeserializeOwned;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            _ => T::deserialize(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
