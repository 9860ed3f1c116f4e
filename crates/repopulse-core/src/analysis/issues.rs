use super::{mean, percentage, IssueMetrics};
use crate::records::IssueRecord;
use crate::timestamp::{elapsed_hours, round2};
use tracing::debug;

/// Analyze issue state counts, resolution rate and average time to close.
///
/// The issues endpoint also lists pull requests; those entries are dropped
/// before anything is counted, so every total and rate here refers to real
/// issues only. Returns `None` when no real issue remains.
pub fn analyze_issues(issues: &[IssueRecord]) -> Option<IssueMetrics> {
    let actual: Vec<&IssueRecord> = issues.iter().filter(|i| !i.is_pull_request).collect();

    if actual.is_empty() {
        return None;
    }

    let total_issues = actual.len();
    let open_issues = actual.iter().filter(|i| i.state.as_deref() == Some("open")).count();
    let closed_issues = actual.iter().filter(|i| i.state.as_deref() == Some("closed")).count();

    let resolution_times: Vec<f64> = actual
        .iter()
        .enumerate()
        .filter_map(|(idx, issue)| {
            let created = issue.created_at.as_deref()?;
            let closed = issue.closed_at.as_deref()?;
            let hours = elapsed_hours(created, closed);
            if hours.is_none() {
                debug!("Skipping resolution time for issue record {}: unparsable timestamp", idx);
            }
            hours
        })
        .collect();

    Some(IssueMetrics {
        total_issues,
        open_issues,
        closed_issues,
        resolution_rate: percentage(closed_issues, total_issues),
        avg_resolution_time_hours: round2(mean(&resolution_times)),
    })
}
