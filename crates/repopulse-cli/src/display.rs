use colored::*;
use repopulse_core::{
    EfficiencyGrade, EfficiencyScoreCalculator, Report, RepositoryAnalysis, RepositoryInfo,
};
use std::io::{self, Write};

/// Number of ranking rows shown in text output.
const TOP_DEVELOPERS: usize = 10;

/// Write a fetched repository analysis for the terminal.
pub fn render_analysis(
    out: &mut dyn Write,
    analysis: &RepositoryAnalysis,
    calculator: &EfficiencyScoreCalculator,
) -> io::Result<()> {
    let title = analysis
        .repository
        .full_name
        .clone()
        .or_else(|| analysis.repository.name.clone())
        .unwrap_or_else(|| "repository".to_string());

    header(out, &title)?;
    render_repository(out, &analysis.repository)?;
    render_body(out, &analysis.report, calculator)
}

/// Write a report built from local files.
pub fn render_report(
    out: &mut dyn Write,
    report: &Report,
    calculator: &EfficiencyScoreCalculator,
) -> io::Result<()> {
    header(out, "local activity data")?;
    render_body(out, report, calculator)
}

fn header(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!(" repopulse v{} — Analyzing {}", env!("CARGO_PKG_VERSION"), title).bold()
    )?;
    writeln!(out)
}

fn render_repository(out: &mut dyn Write, repo: &RepositoryInfo) -> io::Result<()> {
    writeln!(out, " {}", "Repository".bold().underline())?;
    if let Some(description) = &repo.description {
        writeln!(out, " {} {}", "|-".dimmed(), description)?;
    }
    writeln!(
        out,
        " {} Stars: {}  Forks: {}",
        "|-".dimmed(),
        repo.stars.unwrap_or(0),
        repo.forks.unwrap_or(0)
    )?;
    if let Some(language) = &repo.language {
        writeln!(out, " {} Language: {}", "|-".dimmed(), language.cyan())?;
    }
    writeln!(out)
}

fn render_body(
    out: &mut dyn Write,
    report: &Report,
    calculator: &EfficiencyScoreCalculator,
) -> io::Result<()> {
    render_score(out, report, calculator)?;
    separator(out)?;

    if report.is_empty() {
        writeln!(
            out,
            " {} No usable commits, pull requests or issues found.",
            "--".yellow().bold()
        )?;
        writeln!(out)?;
    }

    if let Some(commits) = &report.commit_analysis {
        writeln!(out, " {}", "Commits".bold().underline())?;
        writeln!(out, " {} Total commits:      {}", "|-".dimmed(), commits.total_commits)?;
        writeln!(out, " {} Unique authors:     {}", "|-".dimmed(), commits.unique_authors)?;
        writeln!(
            out,
            " {} Commits per week:   {:.2}",
            "|-".dimmed(),
            commits.commit_frequency_per_week
        )?;
        writeln!(out)?;
    }

    if let Some(prs) = &report.pull_request_analysis {
        writeln!(out, " {}", "Pull Requests".bold().underline())?;
        writeln!(
            out,
            " {} Total: {}  (open {}, closed {}, merged {})",
            "|-".dimmed(),
            prs.total_pull_requests,
            prs.open_prs,
            prs.closed_prs,
            prs.merged_prs.to_string().green()
        )?;
        writeln!(out, " {} Merge rate:         {}", "|-".dimmed(), rate(prs.merge_rate))?;
        writeln!(
            out,
            " {} Avg time to merge:  {}",
            "|-".dimmed(),
            format_hours(prs.avg_merge_time_hours)
        )?;
        writeln!(out)?;
    }

    if let Some(issues) = &report.issue_analysis {
        writeln!(out, " {}", "Issues".bold().underline())?;
        writeln!(
            out,
            " {} Total: {}  (open {}, closed {})",
            "|-".dimmed(),
            issues.total_issues,
            issues.open_issues,
            issues.closed_issues
        )?;
        writeln!(
            out,
            " {} Resolution rate:    {}",
            "|-".dimmed(),
            rate(issues.resolution_rate)
        )?;
        writeln!(
            out,
            " {} Avg time to close:  {}",
            "|-".dimmed(),
            format_hours(issues.avg_resolution_time_hours)
        )?;
        writeln!(out)?;
    }

    if !report.developer_rankings.is_empty() {
        separator(out)?;
        writeln!(out, " {}", "Top Developers".bold().underline())?;
        for (idx, dev) in report.top_developers(TOP_DEVELOPERS).iter().enumerate() {
            writeln!(
                out,
                " {:>3}. {:<28} {:>6} commits  {:>6.2}%",
                idx + 1,
                dev.developer,
                dev.commits,
                dev.contribution_percentage
            )?;
        }
        let hidden = report.developer_rankings.len().saturating_sub(TOP_DEVELOPERS);
        if hidden > 0 {
            writeln!(out, "      {}", format!("... and {} more", hidden).dimmed())?;
        }
        writeln!(out)?;
    }

    separator(out)?;
    writeln!(out, " {}", "Summary".bold().underline())?;
    let summary = &report.summary;
    writeln!(out, " {} Contributors: {}", "|-".dimmed(), summary.total_contributors)?;
    writeln!(out, " {} Commits:      {}", "|-".dimmed(), summary.total_commits)?;
    writeln!(out, " {} PRs:          {}", "|-".dimmed(), summary.total_prs)?;
    writeln!(out, " {} Issues:       {}", "|-".dimmed(), summary.total_issues)?;
    writeln!(out)
}

fn render_score(
    out: &mut dyn Write,
    report: &Report,
    calculator: &EfficiencyScoreCalculator,
) -> io::Result<()> {
    let grade = EfficiencyGrade::from_score(report.efficiency_score);
    let score = format!("{:.2}", report.efficiency_score);
    let score = match grade {
        EfficiencyGrade::Excellent | EfficiencyGrade::Good => score.green().bold(),
        EfficiencyGrade::Fair => score.yellow().bold(),
        EfficiencyGrade::Poor | EfficiencyGrade::Critical => score.red().bold(),
    };

    writeln!(
        out,
        " {} {}/100 ({})",
        "Efficiency Score:".bold(),
        score,
        grade.label().cyan()
    )?;
    writeln!(out, " {} {}", "|".dimmed(), grade.description().dimmed())?;

    let breakdown = calculator.breakdown(
        report.commit_analysis.as_ref(),
        report.pull_request_analysis.as_ref(),
        report.issue_analysis.as_ref(),
    );
    writeln!(
        out,
        " {} commits {:.1} + pull requests {:.1} + issues {:.1} + collaboration {:.1}",
        "|".dimmed(),
        breakdown.commit_activity,
        breakdown.pull_requests,
        breakdown.issues,
        breakdown.collaboration
    )?;
    writeln!(out)
}

fn separator(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, " {}", "=".repeat(60).dimmed())?;
    writeln!(out)
}

fn rate(pct: f64) -> String {
    let text = format!("{:.2}%", pct);
    if pct >= 75.0 {
        text.green().to_string()
    } else if pct >= 40.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format hours as `Xd Yh`, `Xh Ym` or `Ym`.
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as u64;
    let days = total_minutes / (24 * 60);
    let hrs = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    if days > 0 {
        format!("{}d {}h", days, hrs)
    } else if hrs > 0 {
        format!("{}h {}m", hrs, minutes)
    } else {
        format!("{}m", minutes)
    }
}
