//! Import of repositories hosted on GitHub through its REST API.

mod client;
mod error;
mod url;

pub use client::DEFAULT_API_BASE;
pub use client::GithubClient;
pub use error::GithubError;
pub use error::Result;
pub use url::RepoRef;
pub use url::parse_repo_url;
