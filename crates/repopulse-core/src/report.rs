use crate::analysis::{self, empty_object, CommitMetrics, IssueMetrics, PRMetrics};
use crate::efficiency::EfficiencyScoreCalculator;
use crate::ranking::{build_rankings, DeveloperRanking};
use crate::records::{self, CommitRecord, ContributorRecord, IssueRecord, PullRequestRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Headline totals for a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_contributors: usize,
    pub total_commits: usize,
    pub total_prs: usize,
    pub total_issues: usize,
}

/// The complete activity report for a repository.
///
/// A metrics block with no usable input serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub efficiency_score: f64,
    #[serde(with = "empty_object", default)]
    pub commit_analysis: Option<CommitMetrics>,
    #[serde(with = "empty_object", default)]
    pub pull_request_analysis: Option<PRMetrics>,
    #[serde(with = "empty_object", default)]
    pub issue_analysis: Option<IssueMetrics>,
    pub developer_rankings: Vec<DeveloperRanking>,
    pub summary: Summary,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.commit_analysis.is_none()
            && self.pull_request_analysis.is_none()
            && self.issue_analysis.is_none()
    }

    pub fn top_developers(&self, limit: usize) -> &[DeveloperRanking] {
        &self.developer_rankings[..limit.min(self.developer_rankings.len())]
    }
}

/// Owns the four record collections of one repository and reports on them.
#[derive(Debug, Clone, Default)]
pub struct DeveloperAnalyzer {
    commits: Vec<CommitRecord>,
    pull_requests: Vec<PullRequestRecord>,
    issues: Vec<IssueRecord>,
    contributors: Vec<ContributorRecord>,
    calculator: EfficiencyScoreCalculator,
}

impl DeveloperAnalyzer {
    pub fn new(
        commits: Vec<CommitRecord>,
        pull_requests: Vec<PullRequestRecord>,
        issues: Vec<IssueRecord>,
        contributors: Vec<ContributorRecord>,
    ) -> Self {
        Self {
            commits,
            pull_requests,
            issues,
            contributors,
            calculator: EfficiencyScoreCalculator::new(),
        }
    }

    /// Build from raw GitHub API payloads.
    pub fn from_json(
        commits: &[Value],
        pull_requests: &[Value],
        issues: &[Value],
        contributors: &[Value],
    ) -> Self {
        Self::new(
            records::commits_from_values(commits),
            records::pull_requests_from_values(pull_requests),
            records::issues_from_values(issues),
            records::contributors_from_values(contributors),
        )
    }

    pub fn with_calculator(mut self, calculator: EfficiencyScoreCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn contributors(&self) -> &[ContributorRecord] {
        &self.contributors
    }

    pub fn generate_report(&self) -> Report {
        assemble(
            &self.commits,
            &self.pull_requests,
            &self.issues,
            &self.contributors,
            &self.calculator,
        )
    }
}

/// Run every analysis over the four collections and assemble the report.
///
/// Never fails: unusable records are skipped and empty domains show up as
/// absent metrics. Contributors are accepted but do not affect any metric.
pub fn generate_report(
    commits: &[CommitRecord],
    pull_requests: &[PullRequestRecord],
    issues: &[IssueRecord],
    contributors: &[ContributorRecord],
) -> Report {
    assemble(
        commits,
        pull_requests,
        issues,
        contributors,
        &EfficiencyScoreCalculator::new(),
    )
}

fn assemble(
    commits: &[CommitRecord],
    pull_requests: &[PullRequestRecord],
    issues: &[IssueRecord],
    _contributors: &[ContributorRecord],
    calculator: &EfficiencyScoreCalculator,
) -> Report {
    let commit_metrics = analysis::analyze_commits(commits);
    let pr_metrics = analysis::analyze_pull_requests(pull_requests);
    let issue_metrics = analysis::analyze_issues(issues);

    let efficiency_score = calculator.calculate(
        commit_metrics.as_ref(),
        pr_metrics.as_ref(),
        issue_metrics.as_ref(),
    );

    let developer_rankings = commit_metrics
        .as_ref()
        .map(|m| build_rankings(&m.commits_per_author))
        .unwrap_or_default();

    let summary = Summary {
        total_contributors: commit_metrics.as_ref().map_or(0, |m| m.unique_authors),
        total_commits: commit_metrics.as_ref().map_or(0, |m| m.total_commits),
        total_prs: pr_metrics.as_ref().map_or(0, |m| m.total_pull_requests),
        total_issues: issue_metrics.as_ref().map_or(0, |m| m.total_issues),
    };

    info!(
        "Report complete: {} commits, {} pull requests, {} issues, efficiency {:.2}",
        summary.total_commits, summary.total_prs, summary.total_issues, efficiency_score
    );

    Report {
        efficiency_score,
        commit_analysis: commit_metrics,
        pull_request_analysis: pr_metrics,
        issue_analysis: issue_metrics,
        developer_rankings,
        summary,
    }
}
