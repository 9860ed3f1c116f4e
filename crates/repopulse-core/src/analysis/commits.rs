use super::CommitMetrics;
use crate::records::CommitRecord;
use crate::timestamp::{parse_github_timestamp, round2};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome of reading one commit record.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitParse<'a> {
    Parsed {
        author: &'a str,
        date: DateTime<Utc>,
    },
    Skipped(SkipReason),
}

/// Why a commit record was left out of the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingAuthor,
    MissingDate,
    MalformedDate,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::MissingAuthor => "missing author name",
            SkipReason::MissingDate => "missing author date",
            SkipReason::MalformedDate => "malformed author date",
        }
    }
}

pub fn parse_commit(record: &CommitRecord) -> CommitParse<'_> {
    let Some(author) = record.author_name.as_deref() else {
        return CommitParse::Skipped(SkipReason::MissingAuthor);
    };
    let Some(raw_date) = record.author_date.as_deref() else {
        return CommitParse::Skipped(SkipReason::MissingDate);
    };
    match parse_github_timestamp(raw_date) {
        Some(date) => CommitParse::Parsed { author, date },
        None => CommitParse::Skipped(SkipReason::MalformedDate),
    }
}

/// Analyze commit volume, authorship and weekly frequency.
///
/// Records without an author name or with an unparsable date are skipped. An
/// empty name is still a name.
/// Returns `None` when no record survives.
pub fn analyze_commits(commits: &[CommitRecord]) -> Option<CommitMetrics> {
    let mut commits_per_author: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_commits = 0usize;
    let mut earliest: Option<DateTime<Utc>> = None;
    let mut latest: Option<DateTime<Utc>> = None;
    let mut skipped = 0usize;

    for (idx, record) in commits.iter().enumerate() {
        match parse_commit(record) {
            CommitParse::Parsed { author, date } => {
                *commits_per_author.entry(author.to_string()).or_insert(0) += 1;
                total_commits += 1;
                earliest = Some(earliest.map_or(date, |d| d.min(date)));
                latest = Some(latest.map_or(date, |d| d.max(date)));
            }
            CommitParse::Skipped(reason) => {
                debug!("Skipping commit record {}: {}", idx, reason.label());
                skipped += 1;
            }
        }
    }

    if total_commits == 0 {
        debug!("No usable commit records ({} skipped)", skipped);
        return None;
    }

    let commit_frequency_per_week = match (earliest, latest) {
        (Some(first), Some(last)) if total_commits > 1 => {
            weekly_frequency(total_commits, first, last)
        }
        _ => 0.0,
    };

    Some(CommitMetrics {
        total_commits,
        unique_authors: commits_per_author.len(),
        commits_per_author,
        commit_frequency_per_week,
    })
}

/// Commits per week over the span between the first and last commit.
///
/// The span is counted in whole days and floored at one week.
fn weekly_frequency(total_commits: usize, first: DateTime<Utc>, last: DateTime<Utc>) -> f64 {
    let days = (last - first).num_days() as f64;
    let weeks = (days / 7.0).max(1.0);
    round2(total_commits as f64 / weeks)
}
