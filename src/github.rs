use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;
use std::time::Duration;

/// Feedback issues are always filed against this repository, regardless of
/// anything in the request.
pub const GITHUB_ORG: &str = "IBM-Bluemix";
pub const GITHUB_REPO: &str = "bluemix-code";

const GITHUB_API_URL: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Issue-creation payload as the GitHub API expects it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct IssueRequest {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("no issue tracker credential configured")]
    MissingToken,

    #[error("issue tracker request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("issue tracker rejected the issue: HTTP {0}")]
    Rejected(StatusCode),
}

/// Seam between the feedback handler and the remote tracker, so tests can
/// substitute a double.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn submit(&self, issue: &IssueRequest) -> Result<(), TrackerError>;
}

/// Thin authenticated wrapper around the GitHub issue-creation endpoint.
/// Constructed once at startup and shared by every feedback request.
pub struct GithubClient {
    client: reqwest::Client,
    issues_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, TrackerError> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    fn with_base_url(token: Option<String>, base_url: &str) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GithubClient {
            client,
            issues_url: format!(
                "{}/repos/{}/{}/issues",
                base_url.trim_end_matches('/'),
                GITHUB_ORG,
                GITHUB_REPO
            ),
            token,
        })
    }
}

#[async_trait]
impl IssueTracker for GithubClient {
    async fn submit(&self, issue: &IssueRequest) -> Result<(), TrackerError> {
        let token = self.token.as_deref().ok_or(TrackerError::MissingToken)?;

        let response = self
            .client
            .post(&self.issues_url)
            .header(http::header::AUTHORIZATION, format!("token {token}"))
            .header(http::header::ACCEPT, "application/vnd.github+json")
            .json(issue)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(TrackerError::Rejected(status)),
        }
    }
}
