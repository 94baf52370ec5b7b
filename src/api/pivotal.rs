use super::{base_url_from_env, ensure_success, ApiError, TrackerClient, CONNECT_TIMEOUT, USER_AGENT};
use crate::models::{Project, Story};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://www.pivotaltracker.com/services/v5";

/// Overrides [`DEFAULT_API_URL`]
pub const API_URL_ENV: &str = "PIVOTAL_API_URL";

const SERVICE: &str = "Pivotal Tracker";

/// Pivotal Tracker v5 REST client authenticated by API token
pub struct PivotalClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PivotalClient {
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(token, &base_url_from_env(API_URL_ENV, DEFAULT_API_URL))
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header("X-TrackerToken", &self.token)
    }
}

#[async_trait]
impl TrackerClient for PivotalClient {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        debug!("listing tracker projects");
        let response = self.get("/projects").send().await?;
        let projects = ensure_success(SERVICE, response).await?.json().await?;
        Ok(projects)
    }

    async fn find_story(&self, project_id: u64, story_id: u64) -> Result<Option<Story>, ApiError> {
        debug!(project_id, story_id, "fetching story");
        let response = self
            .get(&format!("/projects/{}/stories/{}", project_id, story_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let story = ensure_success(SERVICE, response).await?.json().await?;
        Ok(Some(story))
    }
}
