//! Pull request workflow
//!
//! [`PullRequestWorkflow::compose`] resolves every parameter, asks for the
//! title and body and returns a [`Draft`]; [`Draft::submit`] issues the single
//! create call. Local configuration is only written while resolving, so a
//! failure after composing leaves nothing half-written.

use crate::api::{ApiError, HostingClient, ServiceConnector};
use crate::config::{BranchInspector, ConfigError, ConfigStore};
use crate::models::{PullRequest, RepositoryRef, Story};
use crate::resolver::{PromptError, Prompter, ResolveError, Resolver};
use tracing::info;

const BODY_PROMPT: &str = "Enter pull request body";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to create API client: {0}")]
    Connect(#[source] ApiError),

    #[error("Failed to read pull request text: {0}")]
    Prompt(#[from] PromptError),

    #[error("Cannot determine current branch: {0}")]
    Branch(#[from] ConfigError),

    #[error(transparent)]
    Repository(ApiError),

    #[error("Pull request was not created: {0}")]
    Submission(#[source] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestOptions {
    /// Prefix the title with "Completes" so merging finishes the story
    pub complete: bool,
}

impl Default for PullRequestOptions {
    fn default() -> Self {
        Self { complete: true }
    }
}

/// `[Completes #<id>]`, or `[#<id>]` when the story should stay open
pub fn title_prefix(story_id: u64, complete: bool) -> String {
    let action = if complete { "Completes " } else { "" };
    format!("[{}#{}]", action, story_id)
}

pub fn compose_title(prefix: &str, suffix: &str) -> String {
    let suffix = suffix.trim();
    if suffix.is_empty() {
        prefix.to_string()
    } else {
        format!("{} {}", prefix, suffix)
    }
}

/// A composed pull request waiting to be submitted
pub struct Draft {
    pub story: Story,
    pub repo: RepositoryRef,
    pub head: String,
    pub title: String,
    pub body: String,
    hosting: Box<dyn HostingClient>,
}

impl std::fmt::Debug for Draft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Draft")
            .field("story", &self.story)
            .field("repo", &self.repo)
            .field("head", &self.head)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl Draft {
    /// Create the pull request, head is the branch active when composing
    pub async fn submit(self) -> Result<PullRequest, WorkflowError> {
        info!(repo = %self.repo, head = %self.head, "submitting pull request");
        self.hosting
            .create_pull_request(&self.repo, &self.head, &self.title, &self.body)
            .await
            .map_err(WorkflowError::Submission)
    }
}

pub struct PullRequestWorkflow<'a> {
    store: &'a mut dyn ConfigStore,
    prompter: &'a dyn Prompter,
    branches: &'a dyn BranchInspector,
    connector: &'a dyn ServiceConnector,
}

impl<'a> PullRequestWorkflow<'a> {
    pub fn new(
        store: &'a mut dyn ConfigStore,
        prompter: &'a dyn Prompter,
        branches: &'a dyn BranchInspector,
        connector: &'a dyn ServiceConnector,
    ) -> Self {
        Self {
            store,
            prompter,
            branches,
            connector,
        }
    }

    /// Resolve credentials and the branch's story, then ask for title and body
    pub async fn compose(&mut self, options: PullRequestOptions) -> Result<Draft, WorkflowError> {
        let mut resolver = Resolver::new(&mut *self.store, self.prompter);

        let api_token = resolver.api_token()?;
        let tracker = self
            .connector
            .tracker(&api_token)
            .map_err(WorkflowError::Connect)?;
        let project_id = resolver.project_id(tracker.as_ref()).await?;

        let login = resolver.github_login()?;
        let password = resolver.github_password()?;
        let hosting = self
            .connector
            .hosting(&login, &password)
            .map_err(WorkflowError::Connect)?;
        let repo_url = resolver.github_repo_url()?;
        let repo = RepositoryRef::from_url(&repo_url).map_err(WorkflowError::Repository)?;
        let head = self.branches.current_branch_name()?;

        let story = resolver.story(tracker.as_ref(), project_id).await?;

        let prefix = title_prefix(story.id, options.complete);
        let suffix = self
            .prompter
            .input(&format!("Enter pull request title ({} <title>)", prefix))?;
        let title = compose_title(&prefix, &suffix);
        let body = self.prompter.input(BODY_PROMPT)?;

        Ok(Draft {
            story,
            repo,
            head,
            title,
            body,
            hosting,
        })
    }

    pub async fn run(&mut self, options: PullRequestOptions) -> Result<PullRequest, WorkflowError> {
        self.compose(options).await?.submit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_prefix_completes() {
        assert_eq!(title_prefix(123, true), "[Completes #123]");
    }

    #[test]
    fn test_title_prefix_no_complete() {
        assert_eq!(title_prefix(123, false), "[#123]");
    }

    #[test]
    fn test_compose_title() {
        assert_eq!(compose_title("[#5]", "  Add login "), "[#5] Add login");
        assert_eq!(compose_title("[#5]", ""), "[#5]");
    }

    #[test]
    fn test_default_options_complete_story() {
        assert!(PullRequestOptions::default().complete);
    }
}
