use repopulse_core::records::{self, CommitRecord, IssueRecord, PullRequestRecord};
use repopulse_core::{generate_report, DeveloperAnalyzer, Report};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Get the workspace root (two levels up from CARGO_MANIFEST_DIR of repopulse-core).
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent()
        .unwrap() // crates/
        .parent()
        .unwrap() // workspace root
        .join("tests/fixtures")
}

fn github_fixture(name: &str) -> Vec<Value> {
    let path = fixtures_dir().join("github-api").join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&content).unwrap()
}

fn fixture_analyzer() -> DeveloperAnalyzer {
    DeveloperAnalyzer::from_json(
        &github_fixture("commits.json"),
        &github_fixture("pulls.json"),
        &github_fixture("issues.json"),
        &github_fixture("contributors.json"),
    )
}

// ─── Full fixture report ───

#[test]
fn test_fixture_commit_analysis() {
    let report = fixture_analyzer().generate_report();
    let commits = report.commit_analysis.as_ref().unwrap();

    // Offset timestamp and null author are skipped
    assert_eq!(commits.total_commits, 5);
    assert_eq!(commits.unique_authors, 3);
    assert_eq!(commits.commits_per_author.get("alice"), Some(&3));
    assert_eq!(commits.commits_per_author.get("bob"), Some(&1));
    assert_eq!(commits.commits_per_author.get("carol"), Some(&1));
    assert!(!commits.commits_per_author.contains_key("dave"));
    // 28 whole days -> 4 weeks
    assert_eq!(commits.commit_frequency_per_week, 1.25);
}

#[test]
fn test_fixture_pull_request_analysis() {
    let report = fixture_analyzer().generate_report();
    let prs = report.pull_request_analysis.as_ref().unwrap();

    assert_eq!(prs.total_pull_requests, 4);
    assert_eq!(prs.merged_prs, 2);
    assert_eq!(prs.open_prs, 1);
    assert_eq!(prs.closed_prs, 3);
    assert_eq!(prs.merge_rate, 50.0);
    assert_eq!(prs.avg_merge_time_hours, 15.0);
}

#[test]
fn test_fixture_issue_analysis_excludes_pull_requests() {
    let report = fixture_analyzer().generate_report();
    let issues = report.issue_analysis.as_ref().unwrap();

    assert_eq!(issues.total_issues, 3);
    assert_eq!(issues.open_issues, 1);
    assert_eq!(issues.closed_issues, 2);
    assert_eq!(issues.resolution_rate, 66.67);
    assert_eq!(issues.avg_resolution_time_hours, 30.0);
}

#[test]
fn test_fixture_score_rankings_and_summary() {
    let report = fixture_analyzer().generate_report();

    // 1.25*2 + 50*0.3 + 66.67*0.3 + 3*2
    assert_eq!(report.efficiency_score, 43.5);

    let order: Vec<(&str, usize, f64)> = report
        .developer_rankings
        .iter()
        .map(|r| (r.developer.as_str(), r.commits, r.contribution_percentage))
        .collect();
    assert_eq!(
        order,
        vec![("alice", 3, 60.0), ("bob", 1, 20.0), ("carol", 1, 20.0)]
    );

    assert_eq!(report.summary.total_contributors, 3);
    assert_eq!(report.summary.total_commits, 5);
    assert_eq!(report.summary.total_prs, 4);
    assert_eq!(report.summary.total_issues, 3);
}

#[test]
fn test_fixture_report_is_idempotent() {
    let first = fixture_analyzer().generate_report();
    let second = fixture_analyzer().generate_report();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_fixture_report_json_shape() {
    let report = fixture_analyzer().generate_report();
    let value = serde_json::to_value(&report).unwrap();

    for key in [
        "efficiency_score",
        "commit_analysis",
        "pull_request_analysis",
        "issue_analysis",
        "developer_rankings",
        "summary",
    ] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(value["commit_analysis"]["commits_per_author"]["alice"], 3);
    assert_eq!(value["developer_rankings"][0]["developer"], "alice");
    assert_eq!(value["summary"]["total_issues"], 3);

    let back: Report = serde_json::from_value(value).unwrap();
    assert_eq!(back, report);
}

// ─── Scenarios ───

#[test]
fn test_empty_fixture_files() {
    let empty = github_fixture("empty.json");
    let report = DeveloperAnalyzer::from_json(&empty, &empty, &empty, &empty).generate_report();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(report.efficiency_score, 0.0);
    assert_eq!(value["commit_analysis"], json!({}));
    assert_eq!(value["pull_request_analysis"], json!({}));
    assert_eq!(value["issue_analysis"], json!({}));
    assert_eq!(value["developer_rankings"], json!([]));
}

#[test]
fn test_only_issue_tracker_pull_requests() {
    let issues: Vec<Value> = github_fixture("issues.json")
        .into_iter()
        .filter(|v| v.get("pull_request").is_some())
        .collect();
    assert_eq!(issues.len(), 2);

    let report = generate_report(&[], &[], &records::issues_from_values(&issues), &[]);
    assert!(report.issue_analysis.is_none());
    assert_eq!(report.summary.total_issues, 0);
}

#[test]
fn test_malformed_commit_does_not_affect_valid_ones() {
    let valid = vec![
        CommitRecord::new("alice", "2024-01-01T00:00:00Z"),
        CommitRecord::new("bob", "2024-01-08T00:00:00Z"),
    ];
    let mut dirty = valid.clone();
    dirty.insert(1, CommitRecord::new("mallory", "2024/01/05 12:00"));

    let clean_report = generate_report(&valid, &[], &[], &[]);
    let dirty_report = generate_report(&dirty, &[], &[], &[]);
    assert_eq!(clean_report, dirty_report);
    assert_eq!(
        dirty_report.commit_analysis.unwrap().commit_frequency_per_week,
        2.0
    );
}

#[test]
fn test_rates_bounded_for_mixed_records() {
    let prs: Vec<PullRequestRecord> = (0..9)
        .map(|i| PullRequestRecord {
            state: Some(if i % 3 == 0 { "open" } else { "closed" }.to_string()),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            merged_at: (i % 2 == 0).then(|| format!("2024-01-0{}T00:00:00Z", i % 7 + 2)),
        })
        .collect();
    let issues: Vec<IssueRecord> = (0..7)
        .map(|i| IssueRecord {
            state: Some(if i < 3 { "closed" } else { "open" }.to_string()),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            closed_at: (i < 3).then(|| "2024-01-02T00:00:00Z".to_string()),
            is_pull_request: i == 6,
        })
        .collect();

    let report = generate_report(&[], &prs, &issues, &[]);
    let pr = report.pull_request_analysis.unwrap();
    let issue = report.issue_analysis.unwrap();

    assert!((0.0..=100.0).contains(&pr.merge_rate));
    assert!((0.0..=100.0).contains(&issue.resolution_rate));
    assert_eq!(pr.merged_prs, 5);
    assert_eq!(pr.merge_rate, 55.56);
    assert_eq!(issue.total_issues, 6);
    assert_eq!(issue.resolution_rate, 50.0);
    assert_eq!(issue.avg_resolution_time_hours, 24.0);
    assert!((0.0..=100.0).contains(&report.efficiency_score));
}

#[test]
fn test_ranking_percentages_sum_to_hundred() {
    let authors = ["ana", "ben", "cy", "dee", "eli", "fay", "gus"];
    let commits: Vec<CommitRecord> = (0..41)
        .map(|i| {
            let author = authors[(i * i) % authors.len()];
            CommitRecord::new(author, format!("2024-05-{:02}T12:00:00Z", i % 30 + 1))
        })
        .collect();

    let report = generate_report(&commits, &[], &[], &[]);
    let sum: f64 = report
        .developer_rankings
        .iter()
        .map(|r| r.contribution_percentage)
        .sum();
    assert!((sum - 100.0).abs() <= 0.1, "sum was {}", sum);

    let counts: Vec<usize> = report.developer_rankings.iter().map(|r| r.commits).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(counts.iter().sum::<usize>(), 41);
}
