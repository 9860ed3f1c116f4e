use crate::analysis::percentage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the contributor ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperRanking {
    pub developer: String,
    pub commits: usize,
    pub contribution_percentage: f64,
}

/// Rank authors by commit count, most active first.
///
/// Authors with equal counts are ordered by name.
pub fn build_rankings(commits_per_author: &BTreeMap<String, usize>) -> Vec<DeveloperRanking> {
    let total: usize = commits_per_author.values().sum();

    let mut rankings: Vec<DeveloperRanking> = commits_per_author
        .iter()
        .map(|(author, &commits)| DeveloperRanking {
            developer: author.clone(),
            commits,
            contribution_percentage: percentage(commits, total),
        })
        .collect();

    // Stable sort over name-ordered input keeps ties alphabetical
    rankings.sort_by_key(|r| std::cmp::Reverse(r.commits));
    rankings
}
