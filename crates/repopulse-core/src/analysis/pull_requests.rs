use super::{mean, percentage, PRMetrics};
use crate::records::PullRequestRecord;
use crate::timestamp::{elapsed_hours, round2};
use tracing::debug;

/// Analyze pull request state counts, merge rate and average time to merge.
///
/// Returns `None` for an empty input. A pull request counts as merged when it
/// carries any `merged_at` value; only pairs of parseable timestamps feed the
/// merge-time average.
pub fn analyze_pull_requests(pull_requests: &[PullRequestRecord]) -> Option<PRMetrics> {
    if pull_requests.is_empty() {
        return None;
    }

    let total_pull_requests = pull_requests.len();
    let merged_prs = pull_requests.iter().filter(|pr| pr.is_merged()).count();
    let open_prs = count_state(pull_requests, "open");
    let closed_prs = count_state(pull_requests, "closed");

    let mut merge_times = Vec::new();
    for (idx, pr) in pull_requests.iter().enumerate() {
        let (Some(created), Some(merged)) = (pr.created_at.as_deref(), pr.merged_at.as_deref())
        else {
            continue;
        };
        match elapsed_hours(created, merged) {
            Some(hours) => merge_times.push(hours),
            None => debug!("Skipping merge time for pull request record {}: unparsable timestamp", idx),
        }
    }

    Some(PRMetrics {
        total_pull_requests,
        merged_prs,
        open_prs,
        closed_prs,
        merge_rate: percentage(merged_prs, total_pull_requests),
        avg_merge_time_hours: round2(mean(&merge_times)),
    })
}

fn count_state(pull_requests: &[PullRequestRecord], state: &str) -> usize {
    pull_requests
        .iter()
        .filter(|pr| pr.state.as_deref() == Some(state))
        .count()
}
