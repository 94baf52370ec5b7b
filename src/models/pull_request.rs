use crate::api::ApiError;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

/// Accepts https/ssh/git URLs, scp-style `git@host:owner/repo` and bare `owner/repo`
const REPOSITORY_URL_PATTERN: &str = r"^(?:(?:https?|ssh|git)://(?:[^@/]+@)?[^/]+/|[^@/\s]+@[^:/\s]+:)?(?P<owner>[A-Za-z0-9_.-]+)/(?P<name>[A-Za-z0-9_.-]+?)(?:\.git)?/?$";

/// Owner/name pair addressing a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse the repository a stored URL points at
    pub fn from_url(url: &str) -> Result<Self, ApiError> {
        let re = Regex::new(REPOSITORY_URL_PATTERN)?;
        let caps = re
            .captures(url.trim())
            .ok_or_else(|| ApiError::InvalidRepositoryUrl(url.to_string()))?;

        Ok(Self::new(&caps["owner"], &caps["name"]))
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request as returned by the hosting service after creation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub title: String,
}
