use crate::config::GitHubConfig;
use crate::error::{Error, Result};
use crate::report::{DeveloperAnalyzer, Report};
use crate::EfficiencyScoreCalculator;
use layered::{Execute, Service, Stack};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Response, StatusCode};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tick::Clock;
use tracing::{debug, info, warn};

/// Base delay for exponential backoff between retries
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Delay used for a 429 without a `Retry-After` header
const DEFAULT_RATE_LIMIT_DELAY_SECS: u64 = 5;

/// Owned query pairs, cloned for every attempt
type Query = Vec<(String, String)>;

/// GitHub API client for fetching repository activity
pub struct GitHubClient {
    client: reqwest::Client,
    config: GitHubConfig,
}

/// Repository metadata attached to a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub stars: Option<u64>,
    pub forks: Option<u64>,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Repository payload from `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    name: Option<String>,
    full_name: Option<String>,
    description: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    language: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl From<RepositoryResponse> for RepositoryInfo {
    fn from(r: RepositoryResponse) -> Self {
        Self {
            name: r.name,
            full_name: r.full_name,
            description: r.description,
            stars: r.stargazers_count,
            forks: r.forks_count,
            language: r.language,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A report together with the metadata of the repository it describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub repository: RepositoryInfo,
    #[serde(flatten)]
    pub report: Report,
}

/// Raw activity collections for one repository, as returned by the API
#[derive(Debug, Clone, Default)]
pub struct RepositoryActivity {
    pub commits: Vec<Value>,
    pub pull_requests: Vec<Value>,
    pub issues: Vec<Value>,
    pub contributors: Vec<Value>,
}

impl GitHubClient {
    /// Create a new GitHub API client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repopulse/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(ref t) = config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", t))
                .map_err(|e| Error::InvalidToken(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self { client, config })
    }

    /// Extract `(owner, repo)` from `owner/repo` or a `github.com` URL
    pub fn parse_repo_url(repo_url: &str) -> Result<(String, String)> {
        static URL_RE: OnceLock<Regex> = OnceLock::new();
        let re = URL_RE.get_or_init(|| {
            Regex::new(
                r"^(?:(?:https?://)?(?:www\.)?github\.com/)?([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/*$",
            )
            .expect("repository URL pattern is valid")
        });

        let trimmed = repo_url.trim();
        let caps = re
            .captures(trimmed)
            .ok_or_else(|| Error::InvalidRepoUrl(repo_url.to_string()))?;
        Ok((caps[1].to_string(), caps[2].to_string()))
    }

    /// Fetch repository metadata. Fails on any non-success status.
    pub async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo> {
        let url = format!("{}/repos/{}/{}", self.config.api_base, owner, repo);
        let response = self.get_with_retry(&url, &[]).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url,
            });
        }

        let body: RepositoryResponse = response.json().await?;
        Ok(body.into())
    }

    /// Fetch commits page by page up to `max_commits`.
    ///
    /// Stops at the first empty or failed page and keeps what was fetched.
    pub async fn fetch_commits(&self, owner: &str, repo: &str) -> Vec<Value> {
        let url = format!("{}/repos/{}/{}/commits", self.config.api_base, owner, repo);
        let per_page = self.config.per_page.to_string();

        let mut commits = Vec::new();
        let mut page = 1usize;

        loop {
            let page_str = page.to_string();
            let query = [("per_page", per_page.as_str()), ("page", page_str.as_str())];
            let batch = match self.get_json_array(&url, &query).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("Stopping commit pagination at page {}: {}", page, e);
                    break;
                }
            };

            if batch.is_empty() {
                break;
            }

            commits.extend(batch);
            page += 1;

            if commits.len() >= self.config.max_commits {
                debug!("Reached commit limit of {}", self.config.max_commits);
                break;
            }

            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
        }

        commits
    }

    pub async fn fetch_pull_requests(&self, owner: &str, repo: &str) -> Vec<Value> {
        let url = format!("{}/repos/{}/{}/pulls", self.config.api_base, owner, repo);
        self.fetch_listing("pull requests", &url, true).await
    }

    pub async fn fetch_issues(&self, owner: &str, repo: &str) -> Vec<Value> {
        let url = format!("{}/repos/{}/{}/issues", self.config.api_base, owner, repo);
        self.fetch_listing("issues", &url, true).await
    }

    pub async fn fetch_contributors(&self, owner: &str, repo: &str) -> Vec<Value> {
        let url = format!("{}/repos/{}/{}/contributors", self.config.api_base, owner, repo);
        self.fetch_listing("contributors", &url, false).await
    }

    /// Fetch all four activity collections for a repository
    pub async fn fetch_activity(&self, owner: &str, repo: &str) -> RepositoryActivity {
        let commits = self.fetch_commits(owner, repo).await;
        info!("Fetched {} commits", commits.len());

        let pull_requests = self.fetch_pull_requests(owner, repo).await;
        info!("Fetched {} pull requests", pull_requests.len());

        let issues = self.fetch_issues(owner, repo).await;
        info!("Fetched {} issues", issues.len());

        let contributors = self.fetch_contributors(owner, repo).await;
        info!("Fetched {} contributors", contributors.len());

        RepositoryActivity {
            commits,
            pull_requests,
            issues,
            contributors,
        }
    }

    /// Fetch everything for a repository and build its report
    pub async fn analyze_repository(
        &self,
        owner: &str,
        repo: &str,
        calculator: EfficiencyScoreCalculator,
    ) -> Result<RepositoryAnalysis> {
        info!("Fetching data for {}/{}...", owner, repo);
        let repository = self.fetch_repository(owner, repo).await?;
        let activity = self.fetch_activity(owner, repo).await;

        let report = DeveloperAnalyzer::from_json(
            &activity.commits,
            &activity.pull_requests,
            &activity.issues,
            &activity.contributors,
        )
        .with_calculator(calculator)
        .generate_report();

        Ok(RepositoryAnalysis { repository, report })
    }

    /// Fetch a single listing page; degrades to an empty list on failure
    async fn fetch_listing(&self, what: &str, url: &str, all_states: bool) -> Vec<Value> {
        let per_page = self.config.per_page.to_string();
        let mut query = vec![("per_page", per_page.as_str())];
        if all_states {
            query.push(("state", "all"));
        }

        match self.get_json_array(url, &query).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to fetch {}: {}", what, e);
                Vec::new()
            }
        }
    }

    async fn get_json_array(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
        let response = self.get_with_retry(url, query).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: Value = response.json().await?;
        Ok(match body {
            Value::Array(values) => values,
            _ => Vec::new(),
        })
    }

    /// GET through the retry and timeout layers.
    ///
    /// Returns the last response once retries run out, so the caller sees the
    /// final status.
    async fn get_with_retry(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let clock = Clock::new_tokio();
        let context = ResilienceContext::new(&clock).name("github_get");

        let client = self.client.clone();
        let service = (
            Retry::layer("retry", &context)
                .clone_input()
                .recovery_with(|result: &Result<Response>, _| classify_result(result))
                .max_retry_attempts(self.config.max_retries)
                .base_delay(RETRY_BASE_DELAY)
                .backoff(Backoff::Exponential)
                .on_retry(|_output, args| {
                    warn!(
                        "Retrying GitHub request (attempt {}, delay {}ms)",
                        args.attempt().index() + 1,
                        args.retry_delay().as_millis(),
                    );
                }),
            Timeout::layer("timeout", &context)
                .timeout_error(|args| Error::Timeout(args.timeout()))
                .timeout(Duration::from_secs(self.config.timeout_secs)),
            Execute::new(move |(url, query): (String, Query)| {
                let client = client.clone();
                async move {
                    client
                        .get(&url)
                        .query(&query)
                        .send()
                        .await
                        .map_err(Error::from)
                }
            }),
        )
            .into_service();

        let query: Query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        service.execute((url.to_string(), query)).await
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Classify a request outcome for retry purposes.
fn classify_result(result: &Result<Response>) -> RecoveryInfo {
    match result {
        // Connection failures and timeouts
        Err(_) => RecoveryInfo::retry(),
        Ok(resp) => classify_status(resp.status(), resp.headers()),
    }
}

fn classify_status(status: StatusCode, headers: &HeaderMap) -> RecoveryInfo {
    if status.is_server_error() {
        return RecoveryInfo::retry();
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let secs = parse_retry_after(headers).unwrap_or(DEFAULT_RATE_LIMIT_DELAY_SECS);
        return RecoveryInfo::retry().delay(Duration::from_secs(secs));
    }
    // Secondary rate limit: 403 with Retry-After
    if status == StatusCode::FORBIDDEN {
        return parse_retry_after(headers).map_or_else(RecoveryInfo::never, |secs| {
            RecoveryInfo::retry().delay(Duration::from_secs(secs))
        });
    }
    RecoveryInfo::never()
}
