// git-pivotal - Pivotal Tracker / GitHub branch workflow helper
// Resolves tracker and hosting credentials from layered git config and opens
// story-completing pull requests

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod resolver;
pub mod workflow;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use config::{ConfigKey, ConfigScope, ConfigStore, GitConfigStore, ScopeMode};
pub use models::{Project, PullRequest, RepositoryRef, Story};
pub use resolver::Resolver;
pub use workflow::{PullRequestOptions, PullRequestWorkflow};
