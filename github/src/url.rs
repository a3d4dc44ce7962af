use crate::error::GithubError;
use crate::error::Result;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:]([^/\s]+)/([^/\s?#]+)").expect("repo url pattern is valid")
});

/// Owner and repository name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Pull `owner/repo` out of anything containing `github.com/<owner>/<repo>`.
///
/// Trailing path segments, query strings and a `.git` suffix are ignored, so
/// browser URLs, clone URLs and `git@github.com:owner/repo.git` all work.
pub fn parse_repo_url(url: &str) -> Result<RepoRef> {
    let caps = REPO_URL
        .captures(url.trim())
        .ok_or_else(|| GithubError::InvalidUrl(url.to_string()))?;
    let owner = caps[1].to_string();
    let repo = caps[2].trim_end_matches(".git").to_string();
    if repo.is_empty() {
        return Err(GithubError::InvalidUrl(url.to_string()));
    }
    Ok(RepoRef { owner, repo })
}
