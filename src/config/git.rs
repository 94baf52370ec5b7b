//! git2-backed configuration store and branch inspection

use super::{read_inherited, ConfigError, ConfigKey, ConfigScope, ConfigStore, ScopeMode};
use git2::{Config, ErrorCode, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of the branch checked out at invocation time
pub trait BranchInspector {
    fn current_branch_name(&self) -> Result<String, ConfigError>;
}

/// Reads the current branch from a repository's HEAD
pub struct GitBranchInspector {
    repo: Repository,
}

impl GitBranchInspector {
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self {
            repo: Repository::discover(path)?,
        })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }
}

impl BranchInspector for GitBranchInspector {
    fn current_branch_name(&self) -> Result<String, ConfigError> {
        // Read HEAD symbolically so a branch without commits still has a name
        let head = self.repo.find_reference("HEAD")?;
        head.symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string)
            .ok_or(ConfigError::DetachedHead)
    }
}

/// [`ConfigStore`] over the repository's `.git/config` and the user's global
/// git config file
///
/// Branch scope lives in the repository file as `branch.<name>.<key>`.
#[derive(Debug, Clone)]
pub struct GitConfigStore {
    local_path: PathBuf,
    global_path: PathBuf,
    branch: Option<String>,
}

impl GitConfigStore {
    /// Open the store for the repository containing `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let global_path = match Config::find_global() {
            Ok(found) => found,
            Err(e) if e.code() == ErrorCode::NotFound => dirs::home_dir()
                .map(|home| home.join(".gitconfig"))
                .ok_or(ConfigError::NoGlobalConfig)?,
            Err(e) => return Err(e.into()),
        };
        Self::with_global_path(path, global_path)
    }

    /// Open the store with an explicit global config file
    pub fn with_global_path(
        path: impl AsRef<Path>,
        global_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let repo = Repository::discover(path)?;
        // Linked worktrees share the main repository's config file
        let local_path = repo.commondir().join("config");

        let branch = match GitBranchInspector::from_repository(repo).current_branch_name() {
            Ok(name) => Some(name),
            Err(ConfigError::DetachedHead) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            local_path,
            global_path: global_path.into(),
            branch,
        })
    }

    /// Branch whose scope this store addresses, `None` on a detached HEAD
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// File and variable name addressed by `key` at `scope`
    fn locate(&self, key: ConfigKey, scope: ConfigScope) -> Option<(&Path, String)> {
        match scope {
            ConfigScope::Branch => self.branch.as_ref().map(|branch| {
                (
                    self.local_path.as_path(),
                    format!("branch.{}.{}", branch, key.as_str()),
                )
            }),
            ConfigScope::Local => Some((self.local_path.as_path(), key.as_str().to_string())),
            ConfigScope::Global => Some((self.global_path.as_path(), key.as_str().to_string())),
        }
    }

    fn read_scope(&self, key: ConfigKey, scope: ConfigScope) -> Result<String, ConfigError> {
        let Some((path, name)) = self.locate(key, scope) else {
            return Ok(String::new());
        };

        let config = Config::open(path)?;
        match config.get_string(&name) {
            Ok(value) => Ok(value),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ConfigStore for GitConfigStore {
    fn has_scope(&self, scope: ConfigScope) -> bool {
        scope != ConfigScope::Branch || self.branch.is_some()
    }

    fn get(&self, key: ConfigKey, mode: ScopeMode) -> Result<String, ConfigError> {
        match mode {
            ScopeMode::Only(scope) => self.read_scope(key, scope),
            ScopeMode::Inherited => read_inherited(|scope| self.read_scope(key, scope)),
        }
    }

    fn set(&mut self, key: ConfigKey, value: &str, scope: ConfigScope) -> Result<(), ConfigError> {
        let (path, name) = self.locate(key, scope).ok_or(ConfigError::NoBranch(key))?;
        debug!(key = %name, %scope, path = %path.display(), "writing git config");

        let mut config = Config::open(path)?;
        config.set_str(&name, value)?;
        Ok(())
    }
}
