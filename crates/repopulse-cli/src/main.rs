mod display;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repopulse_core::config::Config;
use repopulse_core::records;
use repopulse_core::{DeveloperAnalyzer, EfficiencyScoreCalculator, GitHubClient};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "repopulse",
    version,
    about = "repopulse — GitHub repository activity analyzer",
    long_about = "Fetch a repository's commits, pull requests and issues from GitHub and report\ncommit cadence, merge and resolution rates, contributor rankings and an efficiency score."
)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a GitHub repository and analyze its activity
    Analyze {
        /// Repository as 'owner/repo' or 'https://github.com/owner/repo'
        repo: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// GitHub token (raises the API rate limit)
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Path to a config file (defaults to ./.repopulse.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of commits to fetch
        #[arg(long)]
        max_commits: Option<usize>,
    },

    /// Analyze activity saved as JSON arrays of GitHub API records
    Report {
        /// Commits JSON file (GET /repos/{owner}/{repo}/commits)
        #[arg(long)]
        commits: Option<PathBuf>,

        /// Pull requests JSON file (GET /repos/{owner}/{repo}/pulls)
        #[arg(long)]
        pulls: Option<PathBuf>,

        /// Issues JSON file (GET /repos/{owner}/{repo}/issues)
        #[arg(long)]
        issues: Option<PathBuf>,

        /// Contributors JSON file (GET /repos/{owner}/{repo}/contributors)
        #[arg(long)]
        contributors: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a config file (defaults to ./.repopulse.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            repo,
            format,
            output,
            token,
            config,
            max_commits,
        } => {
            cmd_analyze(&repo, &format, output.as_deref(), token, config.as_deref(), max_commits)
                .await
        }
        Commands::Report {
            commits,
            pulls,
            issues,
            contributors,
            format,
            output,
            config,
        } => cmd_report(
            commits.as_deref(),
            pulls.as_deref(),
            issues.as_deref(),
            contributors.as_deref(),
            &format,
            output.as_deref(),
            config.as_deref(),
        ),
    }
}

/// Logs go to stderr so JSON on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(Config::discover(path, &cwd)?)
}

async fn cmd_analyze(
    repo: &str,
    format: &str,
    output: Option<&Path>,
    token: Option<String>,
    config_path: Option<&Path>,
    max_commits: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if token.is_some() {
        config.github.token = token;
    }
    if let Some(limit) = max_commits {
        config.github.max_commits = limit;
    }

    let (owner, name) = GitHubClient::parse_repo_url(repo)?;
    let calculator = EfficiencyScoreCalculator::with_weights(config.scoring.clone());
    let client = GitHubClient::new(config.github)?;

    let analysis = client
        .analyze_repository(&owner, &name, calculator.clone())
        .await
        .with_context(|| format!("Failed to analyze {}/{}", owner, name))?;

    info!("Analysis completed successfully");

    match format {
        "json" => write_json(&analysis, output),
        _ => {
            if output.is_some() {
                colored::control::set_override(false);
            }
            write_text(output, |out| display::render_analysis(out, &analysis, &calculator))
        }
    }
}

fn cmd_report(
    commits: Option<&Path>,
    pulls: Option<&Path>,
    issues: Option<&Path>,
    contributors: Option<&Path>,
    format: &str,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    if commits.is_none() && pulls.is_none() && issues.is_none() && contributors.is_none() {
        anyhow::bail!(
            "No input files given. Pass at least one of --commits, --pulls, --issues or --contributors."
        );
    }

    let config = load_config(config_path)?;
    let calculator = EfficiencyScoreCalculator::with_weights(config.scoring);

    let commits = read_records(commits)?;
    let pulls = read_records(pulls)?;
    let issues = read_records(issues)?;
    let contributors = read_records(contributors)?;

    let analyzer = DeveloperAnalyzer::new(
        records::commits_from_values(&commits),
        records::pull_requests_from_values(&pulls),
        records::issues_from_values(&issues),
        records::contributors_from_values(&contributors),
    )
    .with_calculator(calculator.clone());
    let report = analyzer.generate_report();

    match format {
        "json" => write_json(&report, output),
        _ => {
            if output.is_some() {
                colored::control::set_override(false);
            }
            write_text(output, |out| display::render_report(out, &report, &calculator))
        }
    }
}

/// Read a JSON array of raw records; a missing path is an empty collection
fn read_records(path: Option<&Path>) -> Result<Vec<Value>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

    match value {
        Value::Array(values) => Ok(values),
        _ => anyhow::bail!("'{}' must contain a JSON array of records", path.display()),
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn write_text<F>(output: Option<&Path>, render: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            render(&mut writer)
                .and_then(|()| writer.flush())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            render(&mut stdout).context("Failed to write report to stdout")?;
        }
    }
    Ok(())
}
