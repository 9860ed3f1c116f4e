use crate::analysis::{CommitMetrics, IssueMetrics, PRMetrics};
use crate::timestamp::round2;
use serde::{Deserialize, Serialize};

/// Repository efficiency score calculator
///
/// Combines the per-domain metrics into one heuristic 0-100 score:
/// - Commit frequency (0-30)
/// - Pull request merge rate (0-30)
/// - Issue resolution rate (0-30)
/// - Collaboration, by distinct commit authors (0-10)
///
/// The commit and collaboration terms are capped before summing. The merge and
/// resolution terms are only bounded by their 0-100 source percentages.
#[derive(Debug, Clone, Default)]
pub struct EfficiencyScoreCalculator {
    weights: EfficiencyWeights,
}

/// Multipliers and caps for the score terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyWeights {
    pub commit_frequency_multiplier: f64,
    pub commit_cap: f64,
    pub merge_rate_weight: f64,
    pub resolution_rate_weight: f64,
    pub collaboration_multiplier: f64,
    pub collaboration_cap: f64,
}

/// Per-term contributions to the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyBreakdown {
    pub commit_activity: f64,
    pub pull_requests: f64,
    pub issues: f64,
    pub collaboration: f64,

    /// Sum of the terms, clamped to 0-100 and rounded to two decimals
    pub total: f64,
}

/// Efficiency grade categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficiencyGrade {
    Excellent, // 90-100
    Good,      // 75-89
    Fair,      // 60-74
    Poor,      // 40-59
    Critical,  // 0-39
}

pub const MAX_SCORE: f64 = 100.0;

impl Default for EfficiencyWeights {
    fn default() -> Self {
        Self {
            commit_frequency_multiplier: 2.0,
            commit_cap: 30.0,
            merge_rate_weight: 0.3,
            resolution_rate_weight: 0.3,
            collaboration_multiplier: 2.0,
            collaboration_cap: 10.0,
        }
    }
}

impl EfficiencyScoreCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: EfficiencyWeights) -> Self {
        Self { weights }
    }

    /// Calculate the score; absent metrics contribute zero.
    pub fn calculate(
        &self,
        commits: Option<&CommitMetrics>,
        pull_requests: Option<&PRMetrics>,
        issues: Option<&IssueMetrics>,
    ) -> f64 {
        self.breakdown(commits, pull_requests, issues).total
    }

    pub fn breakdown(
        &self,
        commits: Option<&CommitMetrics>,
        pull_requests: Option<&PRMetrics>,
        issues: Option<&IssueMetrics>,
    ) -> EfficiencyBreakdown {
        let w = &self.weights;

        let frequency = commits.map_or(0.0, |c| c.commit_frequency_per_week);
        let commit_activity = (frequency * w.commit_frequency_multiplier).min(w.commit_cap);

        let merge_rate = pull_requests.map_or(0.0, |p| p.merge_rate);
        let pr_term = merge_rate * w.merge_rate_weight;

        let resolution_rate = issues.map_or(0.0, |i| i.resolution_rate);
        let issue_term = resolution_rate * w.resolution_rate_weight;

        let authors = commits.map_or(0, |c| c.unique_authors) as f64;
        let collaboration = (authors * w.collaboration_multiplier).min(w.collaboration_cap);

        let sum = commit_activity + pr_term + issue_term + collaboration;
        let total = round2(sum.clamp(0.0, MAX_SCORE));

        EfficiencyBreakdown {
            commit_activity,
            pull_requests: pr_term,
            issues: issue_term,
            collaboration,
            total,
        }
    }
}

impl EfficiencyGrade {
    pub fn from_score(score: f64) -> Self {
        match score as i32 {
            90..=100 => EfficiencyGrade::Excellent,
            75..=89 => EfficiencyGrade::Good,
            60..=74 => EfficiencyGrade::Fair,
            40..=59 => EfficiencyGrade::Poor,
            _ => EfficiencyGrade::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EfficiencyGrade::Excellent => "Excellent",
            EfficiencyGrade::Good => "Good",
            EfficiencyGrade::Fair => "Fair",
            EfficiencyGrade::Poor => "Poor",
            EfficiencyGrade::Critical => "Critical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EfficiencyGrade::Excellent => "Steady commits, merged pull requests and closed issues",
            EfficiencyGrade::Good => "Healthy activity with minor gaps",
            EfficiencyGrade::Fair => "Active, but pull requests or issues are piling up",
            EfficiencyGrade::Poor => "Low throughput in one or more areas",
            EfficiencyGrade::Critical => "Little recent activity or throughput",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn commits(frequency: f64, authors: usize) -> CommitMetrics {
        CommitMetrics {
            total_commits: authors,
            unique_authors: authors,
            commits_per_author: BTreeMap::new(),
            commit_frequency_per_week: frequency,
        }
    }

    fn prs(merge_rate: f64) -> PRMetrics {
        PRMetrics {
            total_pull_requests: 1,
            merged_prs: 1,
            open_prs: 0,
            closed_prs: 1,
            merge_rate,
            avg_merge_time_hours: 0.0,
        }
    }

    fn issues(resolution_rate: f64) -> IssueMetrics {
        IssueMetrics {
            total_issues: 1,
            open_issues: 0,
            closed_issues: 1,
            resolution_rate,
            avg_resolution_time_hours: 0.0,
        }
    }

    #[test]
    fn test_all_missing_is_zero() {
        let calculator = EfficiencyScoreCalculator::new();
        assert_eq!(calculator.calculate(None, None, None), 0.0);
    }

    #[test]
    fn test_perfect_score() {
        let calculator = EfficiencyScoreCalculator::new();
        let score = calculator.calculate(
            Some(&commits(50.0, 12)),
            Some(&prs(100.0)),
            Some(&issues(100.0)),
        );
        assert_eq!(score, 100.0);
        assert_eq!(EfficiencyGrade::from_score(score), EfficiencyGrade::Excellent);
    }

    #[test]
    fn test_terms_are_capped_independently() {
        let calculator = EfficiencyScoreCalculator::new();
        let breakdown = calculator.breakdown(Some(&commits(100.0, 40)), None, None);
        assert_eq!(breakdown.commit_activity, 30.0);
        assert_eq!(breakdown.collaboration, 10.0);
        assert_eq!(breakdown.total, 40.0);
    }

    #[test]
    fn test_mixed_score() {
        let calculator = EfficiencyScoreCalculator::new();
        // 2.5*2=5, 50*0.3=15, 25*0.3=7.5, 2*2=4
        let score = calculator.calculate(
            Some(&commits(2.5, 2)),
            Some(&prs(50.0)),
            Some(&issues(25.0)),
        );
        assert_eq!(score, 31.5);
        assert_eq!(EfficiencyGrade::from_score(score), EfficiencyGrade::Critical);
    }

    #[test]
    fn test_score_rounded_to_two_decimals() {
        let calculator = EfficiencyScoreCalculator::new();
        // 33.33 * 0.3 = 9.999
        let score = calculator.calculate(None, Some(&prs(33.33)), None);
        assert_eq!(score, 10.0);
    }

    #[test]
    fn test_custom_weights() {
        let calculator = EfficiencyScoreCalculator::with_weights(EfficiencyWeights {
            collaboration_cap: 20.0,
            ..EfficiencyWeights::default()
        });
        let score = calculator.calculate(Some(&commits(0.0, 9)), None, None);
        assert_eq!(score, 18.0);
    }

    #[test]
    fn test_negative_weights_clamped_at_zero() {
        let calculator = EfficiencyScoreCalculator::with_weights(EfficiencyWeights {
            merge_rate_weight: -1.0,
            ..EfficiencyWeights::default()
        });
        let score = calculator.calculate(Some(&commits(1.0, 1)), Some(&prs(80.0)), None);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_score_bounded() {
        let calculator = EfficiencyScoreCalculator::new();
        for freq in [0.0, 1.0, 7.5, 15.0, 400.0] {
            for authors in [0, 1, 5, 100] {
                for rate in [0.0, 12.5, 50.0, 100.0] {
                    let score = calculator.calculate(
                        Some(&commits(freq, authors)),
                        Some(&prs(rate)),
                        Some(&issues(rate)),
                    );
                    assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
                }
            }
        }
    }

    #[test]
    fn test_grade_assignment() {
        assert_eq!(EfficiencyGrade::from_score(95.0), EfficiencyGrade::Excellent);
        assert_eq!(EfficiencyGrade::from_score(85.0), EfficiencyGrade::Good);
        assert_eq!(EfficiencyGrade::from_score(65.0), EfficiencyGrade::Fair);
        assert_eq!(EfficiencyGrade::from_score(45.0), EfficiencyGrade::Poor);
        assert_eq!(EfficiencyGrade::from_score(25.0), EfficiencyGrade::Critical);
    }
}
