//! Remote service clients
//!
//! The tracker and hosting services are reached only through [`TrackerClient`]
//! and [`HostingClient`]; the REST implementations are thin wrappers.

pub mod github;
pub mod pivotal;

pub use github::GithubClient;
pub use pivotal::PivotalClient;

use crate::models::{Project, PullRequest, RepositoryRef, Story};
use async_trait::async_trait;
use std::time::Duration;

/// Applied to every outbound client
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const USER_AGENT: &str = concat!("git-pivotal/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response, body passed through verbatim
    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Cannot determine repository from URL '{0}'")]
    InvalidRepositoryUrl(String),

    #[error("Invalid repository URL pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Project-tracking service
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Every project visible to the authenticated user
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    /// Look up a story by id; `None` when the project has no such story
    async fn find_story(&self, project_id: u64, story_id: u64) -> Result<Option<Story>, ApiError>;
}

/// Code-hosting service
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Open a pull request from `head` against the repository's default base
    async fn create_pull_request(
        &self,
        repo: &RepositoryRef,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest, ApiError>;
}

/// Builds authenticated clients once credentials are resolved
pub trait ServiceConnector {
    fn tracker(&self, api_token: &str) -> Result<Box<dyn TrackerClient>, ApiError>;

    fn hosting(&self, login: &str, password: &str) -> Result<Box<dyn HostingClient>, ApiError>;
}

/// Connects to Pivotal Tracker and GitHub over REST
#[derive(Debug, Default)]
pub struct RestConnector;

impl ServiceConnector for RestConnector {
    fn tracker(&self, api_token: &str) -> Result<Box<dyn TrackerClient>, ApiError> {
        Ok(Box::new(PivotalClient::new(api_token)?))
    }

    fn hosting(&self, login: &str, password: &str) -> Result<Box<dyn HostingClient>, ApiError> {
        Ok(Box::new(GithubClient::new(login, password)?))
    }
}

/// Turn a non-success response into [`ApiError::Rejected`]
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        service,
        status: status.as_u16(),
        message,
    })
}

/// Base URL from the environment, falling back to the public API
pub(crate) fn base_url_from_env(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
