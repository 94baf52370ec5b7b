pub mod pull_request;
pub mod story;

pub use pull_request::{PullRequest, RepositoryRef};
pub use story::{Project, Story};
