use crate::errors::{PrcoError, Result};
use serde::{Deserialize, Serialize};

/// The pull request fields a checkout needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestHeadInfo {
    pub number: u64,
    pub head_branch_name: String,
    pub head_owner_login: String,
    /// Empty when the head repository was deleted
    pub head_repo_name: String,
    pub base_default_branch: Option<String>,
    pub is_cross_repository: bool,
    pub maintainer_can_modify: bool,
}

impl PullRequestHeadInfo {
    /// `pr/<number>/<head branch>`, for same-repo and fork pull requests alike
    pub fn local_branch_name(&self) -> String {
        local_branch_name(self.number, &self.head_branch_name)
    }

    /// The read-only ref the base repository keeps for the pull request head
    pub fn head_ref_path(&self) -> String {
        format!("refs/pull/{}/head", self.number)
    }

    /// Name of the head repository, failing when it no longer exists
    pub fn head_repo(&self) -> Result<&str> {
        if self.head_repo_name.is_empty() {
            return Err(PrcoError::AmbiguousHeadRepo(self.number));
        }
        Ok(&self.head_repo_name)
    }
}

pub fn local_branch_name(number: u64, head_branch_name: &str) -> String {
    format!("pr/{}/{}", number, head_branch_name)
}

// Shapes of the `gh api graphql` responses

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryData<R> {
    pub repository: Option<R>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequestRepository {
    pub default_branch_ref: Option<RefName>,
    pub pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequestsRepository {
    pub default_branch_ref: Option<RefName>,
    pub pull_requests: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestConnection {
    pub nodes: Vec<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Login {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeadRepository {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequestNode {
    pub number: u64,
    pub head_ref_name: String,
    pub head_repository_owner: Option<Login>,
    pub head_repository: Option<HeadRepository>,
    pub is_cross_repository: bool,
    pub maintainer_can_modify: bool,
}

impl PullRequestNode {
    pub fn into_head_info(self, base_default_branch: Option<String>) -> PullRequestHeadInfo {
        PullRequestHeadInfo {
            number: self.number,
            head_branch_name: self.head_ref_name,
            head_owner_login: self
                .head_repository_owner
                .map(|owner| owner.login)
                .unwrap_or_default(),
            head_repo_name: self
                .head_repository
                .map(|repo| repo.name)
                .unwrap_or_default(),
            base_default_branch,
            is_cross_repository: self.is_cross_repository,
            maintainer_can_modify: self.maintainer_can_modify,
        }
    }
}
