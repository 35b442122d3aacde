pub mod cli;
pub mod resolver;
pub mod types;


pub use cli::{GitHubCli, GitHubCliImpl, MockGitHubCli};
pub use resolver::PullRequestResolver;
pub use types::{local_branch_name, PullRequestHeadInfo};
