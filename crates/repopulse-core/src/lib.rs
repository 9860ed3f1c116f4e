pub mod analysis;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod providers;
pub mod ranking;
pub mod records;
pub mod report;
pub mod timestamp;

pub use analysis::{CommitMetrics, IssueMetrics, PRMetrics};
pub use config::Config;
pub use efficiency::{EfficiencyGrade, EfficiencyScoreCalculator, EfficiencyWeights};
pub use error::{Error, Result};
pub use providers::github_api::{GitHubClient, RepositoryAnalysis, RepositoryInfo};
pub use ranking::DeveloperRanking;
pub use records::{CommitRecord, ContributorRecord, IssueRecord, PullRequestRecord};
pub use report::{generate_report, DeveloperAnalyzer, Report, Summary};
