use crate::errors::{PrcoError, Result};
use crate::github::{GitHubCli, PullRequestHeadInfo};
use crate::parser::{parse_reference, PrReference};
use crate::remotes::RemoteDescriptor;

/// Turns a user reference into one pull request record
pub struct PullRequestResolver<T: GitHubCli> {
    pub github_cli: T,
}

impl<T: GitHubCli> PullRequestResolver<T> {
    pub fn new(github_cli: T) -> Self {
        Self { github_cli }
    }

    /// Resolve `reference` relative to the repository `base` points at.
    ///
    /// Numbers are looked up in the base repository, URLs in the repository
    /// they name, and `owner:branch` picks the first open pull request whose
    /// head is that branch in that owner's repository.
    pub fn resolve(&self, reference: &str, base: &RemoteDescriptor) -> Result<PullRequestHeadInfo> {
        self.resolve_reference(&parse_reference(reference)?, base)
    }

    pub fn resolve_reference(
        &self,
        reference: &PrReference,
        base: &RemoteDescriptor,
    ) -> Result<PullRequestHeadInfo> {
        let pr = match reference {
            PrReference::Number(number) => self.github_cli.pull_request(
                &base.host,
                &base.owner_login,
                &base.repo_name,
                *number,
            )?,
            PrReference::Url {
                host,
                owner,
                repo,
                number,
            } => self.github_cli.pull_request(host, owner, repo, *number)?,
            PrReference::Branch { owner, branch } => {
                let owner = owner.as_deref().unwrap_or(&base.owner_login);
                self.find_by_branch(owner, branch, base)?
            }
        };

        log::debug!("Resolved {:?} to {:?}", reference, pr);

        if pr.is_cross_repository {
            pr.head_repo()?;
        }

        Ok(pr)
    }

    fn find_by_branch(
        &self,
        owner: &str,
        branch: &str,
        base: &RemoteDescriptor,
    ) -> Result<PullRequestHeadInfo> {
        self.github_cli
            .open_pull_requests(&base.host, &base.owner_login, &base.repo_name, branch)?
            .into_iter()
            .find(|pr| pr.head_owner_login.eq_ignore_ascii_case(owner))
            .ok_or_else(|| {
                PrcoError::NotFound(format!("branch \"{}:{}\"", owner, branch))
            })
    }
}
