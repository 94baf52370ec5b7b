use super::{read_inherited, ConfigError, ConfigKey, ConfigScope, ConfigStore, ScopeMode};
use std::collections::HashMap;

/// In-memory [`ConfigStore`] with the same scope semantics as the git-backed one
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigStore {
    values: HashMap<(ConfigScope, ConfigKey), String>,
    writes: Vec<(ConfigKey, ConfigScope)>,
    detached: bool,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seed, does not count as a write
    pub fn with(mut self, key: ConfigKey, value: &str, scope: ConfigScope) -> Self {
        self.values.insert((scope, key), value.to_string());
        self
    }

    /// Behave like a detached HEAD: no branch scope
    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    /// Every `set` issued against this store, in order
    pub fn writes(&self) -> &[(ConfigKey, ConfigScope)] {
        &self.writes
    }

    fn read_scope(&self, key: ConfigKey, scope: ConfigScope) -> String {
        if !self.has_scope(scope) {
            return String::new();
        }
        self.values.get(&(scope, key)).cloned().unwrap_or_default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn has_scope(&self, scope: ConfigScope) -> bool {
        !(self.detached && scope == ConfigScope::Branch)
    }

    fn get(&self, key: ConfigKey, mode: ScopeMode) -> Result<String, ConfigError> {
        match mode {
            ScopeMode::Only(scope) => Ok(self.read_scope(key, scope)),
            ScopeMode::Inherited => read_inherited(|scope| Ok(self.read_scope(key, scope))),
        }
    }

    fn set(&mut self, key: ConfigKey, value: &str, scope: ConfigScope) -> Result<(), ConfigError> {
        if !self.has_scope(scope) {
            return Err(ConfigError::NoBranch(key));
        }
        self.values.insert((scope, key), value.to_string());
        self.writes.push((key, scope));
        Ok(())
    }
}
