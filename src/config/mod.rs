//! Scoped configuration store
//!
//! Values live at one of three scopes: the current branch, the repository, or
//! the user's global git config. Reads either address one scope directly or walk
//! the scopes from most to least specific; writes always address exactly one
//! scope.

pub mod git;
pub mod memory;

pub use git::{BranchInspector, GitBranchInspector, GitConfigStore};
pub use memory::MemoryConfigStore;

use std::fmt;

/// Storage level of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigScope {
    /// Attached to the branch checked out at invocation time
    Branch,
    /// Repository-local (`.git/config`)
    Local,
    /// User-wide (`~/.gitconfig`)
    Global,
}

impl ConfigScope {
    /// Scopes in inherited lookup order, most specific first
    pub const SEARCH_ORDER: [ConfigScope; 3] =
        [ConfigScope::Branch, ConfigScope::Local, ConfigScope::Global];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigScope::Branch => "branch",
            ConfigScope::Local => "local",
            ConfigScope::Global => "global",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a read addresses the scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// Search every scope in [`ConfigScope::SEARCH_ORDER`], first non-empty wins
    Inherited,
    /// Read exactly one scope
    Only(ConfigScope),
}

/// Every key this tool reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiToken,
    ProjectId,
    StoryId,
    GithubLogin,
    GithubPassword,
    GithubRepoUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::ApiToken,
        ConfigKey::ProjectId,
        ConfigKey::StoryId,
        ConfigKey::GithubLogin,
        ConfigKey::GithubPassword,
        ConfigKey::GithubRepoUrl,
    ];

    /// Git config variable name. Branch-scoped keys are stored under
    /// `branch.<name>.<key>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiToken => "pivotal.api-token",
            ConfigKey::ProjectId => "pivotal.project-id",
            ConfigKey::StoryId => "pivotal-story-id",
            ConfigKey::GithubLogin => "github.login",
            ConfigKey::GithubPassword => "github.password",
            ConfigKey::GithubRepoUrl => "github.repo-url",
        }
    }

    /// Mode used when resolving the key
    pub fn read_mode(&self) -> ScopeMode {
        match self {
            ConfigKey::StoryId => ScopeMode::Only(ConfigScope::Branch),
            _ => ScopeMode::Inherited,
        }
    }

    /// The single scope a newly obtained value is written to
    pub fn write_scope(&self) -> ConfigScope {
        match self {
            ConfigKey::ApiToken | ConfigKey::GithubLogin | ConfigKey::GithubPassword => {
                ConfigScope::Global
            }
            ConfigKey::ProjectId | ConfigKey::GithubRepoUrl => ConfigScope::Local,
            ConfigKey::StoryId => ConfigScope::Branch,
        }
    }

    /// Whether the value must stay out of logs and terminal echo
    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::ApiToken | ConfigKey::GithubPassword)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Git config error: {0}")]
    Git(#[from] git2::Error),

    #[error("No branch is checked out, cannot use branch scope for '{0}'")]
    NoBranch(ConfigKey),

    #[error("HEAD is detached, no current branch")]
    DetachedHead,

    #[error("Could not locate the global git config file")]
    NoGlobalConfig,
}

/// Key/scope-addressed configuration storage
///
/// A read of an unset key returns an empty string; callers treat emptiness as
/// "unresolved".
pub trait ConfigStore {
    /// Whether `scope` can be addressed at all, e.g. no branch scope on a
    /// detached HEAD
    fn has_scope(&self, _scope: ConfigScope) -> bool {
        true
    }

    fn get(&self, key: ConfigKey, mode: ScopeMode) -> Result<String, ConfigError>;

    fn set(&mut self, key: ConfigKey, value: &str, scope: ConfigScope) -> Result<(), ConfigError>;
}

/// Walk the scopes in search order using a single-scope reader
pub(crate) fn read_inherited<F>(mut read: F) -> Result<String, ConfigError>
where
    F: FnMut(ConfigScope) -> Result<String, ConfigError>,
{
    for scope in ConfigScope::SEARCH_ORDER {
        let value = read(scope)?;
        if !value.is_empty() {
            return Ok(value);
        }
    }
    Ok(String::new())
}
