use crate::{
    core::{execute_plan, prepare_checkout},
    errors::{PrcoError, Result},
    git::{Git, GitCommandExecutor},
    github::{GitHubCli, GitHubCliImpl, PullRequestResolver},
};
use clap::Args;

#[derive(Debug, Args)]
pub struct Checkout {
    /// Pull request number, URL or `owner:branch`
    pub reference: String,

    /// Remote of the repository the pull request targets (defaults to `prco.remote`)
    #[arg(long)]
    pub remote: Option<String>,

    /// Print the git commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

impl Checkout {
    pub fn execute(&self, git: Git) -> Result<()> {
        let github_cli = GitHubCliImpl::new();
        if !github_cli.is_available()? {
            log::error!("Install gh for pull request lookups: https://cli.github.com/");
            return Err(PrcoError::GitHubCliNotFound);
        }
        let resolver = PullRequestResolver::new(github_cli);

        let configured_remote = self
            .remote
            .as_deref()
            .or(git.config.prco.base_remote.as_deref());
        let plan = prepare_checkout(&self.reference, &git, &resolver, configured_remote)?;

        if self.dry_run {
            for operation in &plan {
                println!("{}", operation);
            }
            return Ok(());
        }

        let executor = GitCommandExecutor::new(git.workdir());
        execute_plan(&plan, &executor)?;
        println!("✅ Switched to {}", plan.branch);

        Ok(())
    }
}
