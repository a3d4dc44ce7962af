use thiserror::Error;

pub type Result<T> = std::result::Result<T, GithubError>;

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("repository {0} not found")]
    NotFound(String),

    #[error("GitHub API returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("cannot decode response: {0}")]
    Decode(String),
}
