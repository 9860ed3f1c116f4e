use std::path::PathBuf;

/// Errors raised by the fetcher and configuration layers.
///
/// The metrics engine itself never fails; malformed records are skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid GitHub repository URL '{0}': expected 'owner/repo' or 'https://github.com/owner/repo'")]
    InvalidRepoUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}")]
    Api { status: u16, url: String },

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("invalid GitHub token: {0}")]
    InvalidToken(String),

    #[error("failed to load config '{}': {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
