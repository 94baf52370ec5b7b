//! Credential and parameter resolution
//!
//! Every parameter follows one protocol: read the key from the config store
//! using the key's read mode; when nothing is stored, obtain the value through
//! the [`Prompter`] and write it to the key's single destination scope.
//! [`lookup`] and [`persist`] are the two halves of that protocol, [`Resolver`]
//! puts them together with the interactive step.

pub mod prompt;

pub use prompt::{Answer, DialoguerPrompter, PromptError, Prompter, ScriptedPrompter};

use crate::api::{ApiError, TrackerClient};
use crate::config::{ConfigError, ConfigKey, ConfigScope, ConfigStore};
use crate::models::story::sort_for_menu;
use crate::models::Story;
use tracing::{debug, info};

const API_TOKEN_PROMPT: &str = "Pivotal API Token (found at https://www.pivotaltracker.com/profile)";
const PROJECT_PROMPT: &str = "Choose project associated with this repository";
const STORY_PROMPT: &str = "Pivotal story id for this branch";
const GITHUB_LOGIN_PROMPT: &str = "Github login";
const GITHUB_PASSWORD_PROMPT: &str = "Github password";
const GITHUB_REPO_URL_PROMPT: &str = "Github repo url";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("'{key}' is not configured and could not be obtained interactively: {source}")]
    Unresolved {
        key: ConfigKey,
        #[source]
        source: PromptError,
    },

    #[error("No tracker projects are available to choose from")]
    NoProjects,

    #[error("Configured project id '{0}' is not a number")]
    InvalidProjectId(String),

    #[error("Story id '{0}' is not a number")]
    InvalidStoryId(String),

    #[error("Story #{story_id} not found in project {project_id}")]
    StoryNotFound { project_id: u64, story_id: u64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Already present in the store, nothing written
    Stored,
    /// Obtained interactively and written to the key's destination scope
    Prompted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub origin: Origin,
}

/// Read `key` with its read mode, `None` when nothing non-empty is stored
pub fn lookup(store: &dyn ConfigStore, key: ConfigKey) -> Result<Option<String>, ConfigError> {
    let value = store.get(key, key.read_mode())?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Write `value` to the destination scope of `key`
pub fn persist(store: &mut dyn ConfigStore, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
    let scope = key.write_scope();
    info!(key = %key, %scope, "storing configuration value");
    store.set(key, value, scope)
}

/// Resolves parameters against a store, prompting for whatever is missing
pub struct Resolver<'a> {
    store: &'a mut dyn ConfigStore,
    prompter: &'a dyn Prompter,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a mut dyn ConfigStore, prompter: &'a dyn Prompter) -> Self {
        Self { store, prompter }
    }

    /// Generic protocol for free-text parameters
    ///
    /// Answers are trimmed; an empty answer is stored as-is.
    pub fn resolve_text(&mut self, key: ConfigKey, prompt: &str) -> Result<Resolved, ResolveError> {
        if let Some(value) = lookup(&*self.store, key)? {
            debug!(key = %key, "resolved from config");
            return Ok(Resolved {
                value,
                origin: Origin::Stored,
            });
        }

        let answer = if key.is_secret() {
            self.prompter.secret(prompt)
        } else {
            self.prompter.input(prompt)
        }
        .map_err(|source| ResolveError::Unresolved { key, source })?;

        let value = answer.trim().to_string();
        persist(&mut *self.store, key, &value)?;
        Ok(Resolved {
            value,
            origin: Origin::Prompted,
        })
    }

    /// The user's tracker API token, stored globally
    pub fn api_token(&mut self) -> Result<String, ResolveError> {
        Ok(self.resolve_text(ConfigKey::ApiToken, API_TOKEN_PROMPT)?.value)
    }

    pub fn github_login(&mut self) -> Result<String, ResolveError> {
        Ok(self.resolve_text(ConfigKey::GithubLogin, GITHUB_LOGIN_PROMPT)?.value)
    }

    pub fn github_password(&mut self) -> Result<String, ResolveError> {
        Ok(self
            .resolve_text(ConfigKey::GithubPassword, GITHUB_PASSWORD_PROMPT)?
            .value)
    }

    /// Hosting repository URL, stored per repository
    pub fn github_repo_url(&mut self) -> Result<String, ResolveError> {
        Ok(self
            .resolve_text(ConfigKey::GithubRepoUrl, GITHUB_REPO_URL_PROMPT)?
            .value)
    }

    /// Tracker project for this repository
    ///
    /// When unset, the user picks from every project, sorted by name, and the
    /// choice is stored repository-locally.
    pub async fn project_id(&mut self, tracker: &dyn TrackerClient) -> Result<u64, ResolveError> {
        let key = ConfigKey::ProjectId;
        if let Some(value) = lookup(&*self.store, key)? {
            return value
                .trim()
                .parse()
                .map_err(|_| ResolveError::InvalidProjectId(value));
        }

        let mut projects = tracker.list_projects().await?;
        if projects.is_empty() {
            return Err(ResolveError::NoProjects);
        }
        sort_for_menu(&mut projects);

        let labels: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();
        let index = self
            .prompter
            .choose(PROJECT_PROMPT, &labels)
            .map_err(|source| ResolveError::Unresolved { key, source })?;
        let project = projects
            .get(index)
            .ok_or(ResolveError::Unresolved {
                key,
                source: PromptError::Cancelled,
            })?;

        persist(&mut *self.store, key, &project.id.to_string())?;
        Ok(project.id)
    }

    /// Story associated with the current branch
    ///
    /// Only the branch scope is consulted. A branch without a story asks for
    /// the id once and associates the story after it is found.
    pub async fn story(
        &mut self,
        tracker: &dyn TrackerClient,
        project_id: u64,
    ) -> Result<Story, ResolveError> {
        let key = ConfigKey::StoryId;
        let (raw, prompted) = match lookup(&*self.store, key)? {
            Some(value) => (value, false),
            None => {
                // Nowhere to associate an answer, so do not ask for one
                if !self.store.has_scope(ConfigScope::Branch) {
                    return Err(ConfigError::NoBranch(key).into());
                }
                let answer = self
                    .prompter
                    .input(STORY_PROMPT)
                    .map_err(|source| ResolveError::Unresolved { key, source })?;
                (answer.trim().to_string(), true)
            }
        };

        let story_id: u64 = raw
            .trim()
            .trim_start_matches('#')
            .parse()
            .map_err(|_| ResolveError::InvalidStoryId(raw.clone()))?;

        let story = tracker
            .find_story(project_id, story_id)
            .await?
            .ok_or(ResolveError::StoryNotFound {
                project_id,
                story_id,
            })?;

        if prompted {
            self.associate_story(&story)?;
        }
        Ok(story)
    }

    /// Record `story` as the current branch's story, replacing any previous one
    pub fn associate_story(&mut self, story: &Story) -> Result<(), ResolveError> {
        persist(&mut *self.store, ConfigKey::StoryId, &story.id.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfigStore, ScopeMode};
    use crate::models::Project;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeTracker {
        projects: Vec<Project>,
        stories: Vec<(u64, Story)>,
        list_calls: AtomicUsize,
        find_calls: AtomicUsize,
    }

    #[async_trait]
    impl TrackerClient for FakeTracker {
        async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.projects.clone())
        }

        async fn find_story(&self, project_id: u64, story_id: u64) -> Result<Option<Story>, ApiError> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .stories
                .iter()
                .find(|(pid, s)| *pid == project_id && s.id == story_id)
                .map(|(_, s)| s.clone()))
        }
    }

    fn tracker_with_projects() -> FakeTracker {
        FakeTracker {
            projects: vec![
                Project { id: 2, name: "Beta".into() },
                Project { id: 1, name: "Alpha".into() },
            ],
            stories: vec![(1, Story::new(77, "Fix bug"))],
            ..FakeTracker::default()
        }
    }

    #[test]
    fn test_lookup_treats_empty_as_unresolved() {
        let store = MemoryConfigStore::new().with(ConfigKey::ApiToken, "", ConfigScope::Global);
        assert_eq!(lookup(&store, ConfigKey::ApiToken).unwrap(), None);
    }

    #[test]
    fn test_stored_value_never_prompts() {
        let mut store =
            MemoryConfigStore::new().with(ConfigKey::ApiToken, "abc", ConfigScope::Local);
        let prompter = ScriptedPrompter::new([]);

        let resolved = Resolver::new(&mut store, &prompter)
            .resolve_text(ConfigKey::ApiToken, "token")
            .unwrap();

        assert_eq!(resolved.value, "abc");
        assert_eq!(resolved.origin, Origin::Stored);
        assert!(prompter.asked().is_empty());
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_prompted_value_trimmed_and_stored_globally() {
        let mut store = MemoryConfigStore::new();
        let prompter = ScriptedPrompter::new([Answer::Text("  abc123 \n".into())]);

        let token = Resolver::new(&mut store, &prompter).api_token().unwrap();

        assert_eq!(token, "abc123");
        assert_eq!(store.writes(), &[(ConfigKey::ApiToken, ConfigScope::Global)]);
        assert_eq!(
            store
                .get(ConfigKey::ApiToken, ScopeMode::Only(ConfigScope::Global))
                .unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_second_resolution_is_idempotent() {
        let mut store = MemoryConfigStore::new();
        let prompter = ScriptedPrompter::new([Answer::Text("octocat".into())]);

        let mut resolver = Resolver::new(&mut store, &prompter);
        assert_eq!(resolver.github_login().unwrap(), "octocat");
        assert_eq!(resolver.github_login().unwrap(), "octocat");

        assert_eq!(prompter.asked().len(), 1);
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn test_repo_url_stored_locally() {
        let mut store = MemoryConfigStore::new();
        let prompter = ScriptedPrompter::new([Answer::Text("https://github.com/acme/w".into())]);

        Resolver::new(&mut store, &prompter)
            .github_repo_url()
            .unwrap();

        assert_eq!(store.writes(), &[(ConfigKey::GithubRepoUrl, ConfigScope::Local)]);
    }

    #[test]
    fn test_empty_answer_is_accepted() {
        let mut store = MemoryConfigStore::new();
        let prompter = ScriptedPrompter::new([Answer::Text("   ".into())]);

        let password = Resolver::new(&mut store, &prompter)
            .github_password()
            .unwrap();

        assert_eq!(password, "");
        assert_eq!(
            store.writes(),
            &[(ConfigKey::GithubPassword, ConfigScope::Global)]
        );
    }

    #[test]
    fn test_prompt_failure_is_unresolved() {
        let mut store = MemoryConfigStore::new();
        let prompter = ScriptedPrompter::new([]);

        let err = Resolver::new(&mut store, &prompter)
            .github_login()
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Unresolved {
                key: ConfigKey::GithubLogin,
                ..
            }
        ));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_project_menu_sorted_by_name() {
        let mut store = MemoryConfigStore::new();
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([Answer::Choice(1)]);

        let project_id = Resolver::new(&mut store, &prompter)
            .project_id(&tracker)
            .await
            .unwrap();

        assert_eq!(prompter.menus(), vec![vec!["Alpha".to_string(), "Beta".to_string()]]);
        assert_eq!(project_id, 2);
        assert_eq!(store.writes(), &[(ConfigKey::ProjectId, ConfigScope::Local)]);
        assert_eq!(
            store.get(ConfigKey::ProjectId, ScopeMode::Inherited).unwrap(),
            "2"
        );
    }

    #[tokio::test]
    async fn test_stored_project_skips_listing() {
        let mut store =
            MemoryConfigStore::new().with(ConfigKey::ProjectId, "1", ConfigScope::Global);
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([]);

        let project_id = Resolver::new(&mut store, &prompter)
            .project_id(&tracker)
            .await
            .unwrap();

        assert_eq!(project_id, 1);
        assert_eq!(tracker.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_projects_fails() {
        let mut store = MemoryConfigStore::new();
        let tracker = FakeTracker::default();
        let prompter = ScriptedPrompter::new([]);

        let err = Resolver::new(&mut store, &prompter)
            .project_id(&tracker)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::NoProjects));
        assert!(prompter.asked().is_empty());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_project_id() {
        let mut store =
            MemoryConfigStore::new().with(ConfigKey::ProjectId, "alpha", ConfigScope::Local);
        let prompter = ScriptedPrompter::new([]);

        let err = Resolver::new(&mut store, &prompter)
            .project_id(&FakeTracker::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidProjectId(v) if v == "alpha"));
    }

    #[tokio::test]
    async fn test_story_from_branch_scope() {
        let mut store = MemoryConfigStore::new().with(ConfigKey::StoryId, "77", ConfigScope::Branch);
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([]);

        let story = Resolver::new(&mut store, &prompter)
            .story(&tracker, 1)
            .await
            .unwrap();

        assert_eq!(story, Story::new(77, "Fix bug"));
        assert!(store.writes().is_empty());
        assert_eq!(tracker.find_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_story_ignores_other_scopes() {
        let mut store = MemoryConfigStore::new().with(ConfigKey::StoryId, "77", ConfigScope::Local);
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([Answer::Text("77".into())]);

        Resolver::new(&mut store, &prompter)
            .story(&tracker, 1)
            .await
            .unwrap();

        assert_eq!(prompter.asked(), vec![STORY_PROMPT.to_string()]);
        assert_eq!(store.writes(), &[(ConfigKey::StoryId, ConfigScope::Branch)]);
    }

    #[tokio::test]
    async fn test_story_not_found() {
        let mut store = MemoryConfigStore::new().with(ConfigKey::StoryId, "78", ConfigScope::Branch);
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([]);

        let err = Resolver::new(&mut store, &prompter)
            .story(&tracker, 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::StoryNotFound {
                project_id: 1,
                story_id: 78
            }
        ));
    }

    #[tokio::test]
    async fn test_prompted_story_not_found_is_not_associated() {
        let mut store = MemoryConfigStore::new();
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([Answer::Text("999".into())]);

        let result = Resolver::new(&mut store, &prompter).story(&tracker, 1).await;

        assert!(result.is_err());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_story_id() {
        let mut store =
            MemoryConfigStore::new().with(ConfigKey::StoryId, "abc", ConfigScope::Branch);
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([]);

        let err = Resolver::new(&mut store, &prompter)
            .story(&tracker, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::InvalidStoryId(v) if v == "abc"));
        assert_eq!(tracker.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_story_on_detached_head_fails_before_prompting() {
        let mut store = MemoryConfigStore::new().detached();
        let tracker = tracker_with_projects();
        let prompter = ScriptedPrompter::new([Answer::Text("77".into())]);

        let err = Resolver::new(&mut store, &prompter)
            .story(&tracker, 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Config(ConfigError::NoBranch(ConfigKey::StoryId))
        ));
        assert!(prompter.asked().is_empty());
        assert_eq!(tracker.find_calls.load(Ordering::SeqCst), 0);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_associate_story_overwrites_branch_value() {
        let mut store = MemoryConfigStore::new().with(ConfigKey::StoryId, "1", ConfigScope::Branch);
        let prompter = ScriptedPrompter::new([]);

        Resolver::new(&mut store, &prompter)
            .associate_story(&Story::new(42, "Other"))
            .unwrap();

        assert_eq!(
            store
                .get(ConfigKey::StoryId, ScopeMode::Only(ConfigScope::Branch))
                .unwrap(),
            "42"
        );
    }
}
