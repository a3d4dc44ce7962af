use crate::error::GithubError;
use crate::error::Result;
use crate::url::RepoRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::DateTime;
use chrono::Utc;
use devdeck_registry::ProjectId;
use devdeck_registry::RemoteProject;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    owner: OwnerResponse,
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    watchers_count: u64,
    language: Option<String>,
    topics: Option<Vec<String>>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

impl From<RepoResponse> for RemoteProject {
    fn from(data: RepoResponse) -> Self {
        RemoteProject {
            id: ProjectId::new(),
            owner: data.owner.login,
            name: data.name,
            description: data.description.unwrap_or_default(),
            language: data.language,
            repo_url: data.html_url,
            stars: data.stargazers_count,
            forks: data.forks_count,
            watchers: data.watchers_count,
            tags: data.topics.unwrap_or_default(),
            is_favorite: false,
            last_updated: data.updated_at,
            created_at: data.created_at,
            screenshot: None,
        }
    }
}

/// Client for the two repository endpoints the importer needs.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Base URL and token taken from `DEVDECK_GITHUB_API` and
    /// `GITHUB_TOKEN` when set.
    pub fn from_env() -> Self {
        let mut client = Self::new();
        if let Ok(base) = std::env::var("DEVDECK_GITHUB_API")
            && !base.trim().is_empty()
        {
            client = client.with_base_url(base);
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN")
            && !token.trim().is_empty()
        {
            client = client.with_token(token);
        }
        client
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Repository metadata mapped onto a fresh [`RemoteProject`].
    pub async fn fetch_repo(&self, repo: &RepoRef) -> Result<RemoteProject> {
        let url = format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.repo);
        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound(repo.to_string()));
        }
        let response = check_status(response, &url)?;
        let data: RepoResponse = response
            .json()
            .await
            .map_err(|e| GithubError::Decode(e.to_string()))?;
        tracing::debug!("fetched {repo} ({} stars)", data.stargazers_count);
        Ok(data.into())
    }

    /// README markdown, or `None` when the repository has none.
    pub async fn fetch_readme(&self, repo: &RepoRef) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{}/readme", self.base_url, repo.owner, repo.repo);
        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("{repo} has no README");
            return Ok(None);
        }
        let response = check_status(response, &url)?;
        let data: ReadmeResponse = response
            .json()
            .await
            .map_err(|e| GithubError::Decode(e.to_string()))?;
        if let Some(encoding) = data.encoding.as_deref()
            && encoding != "base64"
        {
            return Err(GithubError::Decode(format!("unexpected encoding {encoding}")));
        }
        decode_content(&data.content).map(Some)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(
                reqwest::header::USER_AGENT,
                concat!("devdeck/", env!("CARGO_PKG_VERSION")),
            )
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GithubError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// The contents endpoint wraps base64 at 60 columns.
fn decode_content(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| GithubError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| GithubError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_wrapped_base64() {
        assert_eq!(decode_content("IyBIZWxs\nbyB3b3Js\nZA==\n").unwrap(), "# Hello world");
        assert!(decode_content("!!!").is_err());
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let data: RepoResponse = serde_json::from_value(serde_json::json!({
            "name": "tiny",
            "owner": { "login": "me" },
            "description": null,
            "html_url": "https://github.com/me/tiny",
            "language": null,
            "updated_at": "2024-05-01T10:00:00Z",
            "created_at": "2020-01-01T00:00:00Z"
        }))
        .unwrap();
        let project = RemoteProject::from(data);
        assert_eq!(project.description, "");
        assert!(project.tags.is_empty());
        assert_eq!(project.stars, 0);
        assert_eq!(project.language, None);
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = GithubClient::new().with_base_url("http://localhost:9/");
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
