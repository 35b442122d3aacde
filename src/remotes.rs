use crate::errors::{PrcoError, Result};
use crate::github::PullRequestHeadInfo;

/// Remote names tried, in order, when no base remote is configured
const BASE_REMOTE_CANDIDATES: [&str; 3] = ["upstream", "github", "origin"];

/// A configured remote and the repository it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDescriptor {
    pub name: String,
    pub host: String,
    pub owner_login: String,
    pub repo_name: String,
}

impl RemoteDescriptor {
    pub fn new(name: &str, host: &str, owner_login: &str, repo_name: &str) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            owner_login: owner_login.to_string(),
            repo_name: repo_name.to_string(),
        }
    }

    pub fn points_at(&self, owner_login: &str, repo_name: &str) -> bool {
        self.owner_login.eq_ignore_ascii_case(owner_login)
            && self.repo_name.eq_ignore_ascii_case(repo_name)
    }

    /// `https://<host>/<owner>/<repo>.git` for another repository on the same host
    pub fn clone_url_for(&self, owner_login: &str, repo_name: &str) -> String {
        format!("https://{}/{}/{}.git", self.host, owner_login, repo_name)
    }
}

/// Pick the remote the current repository context refers to.
///
/// An explicit name must exist. Otherwise the conventional names are tried in
/// order and the first remote is the fallback.
pub fn base_remote<'a>(
    remotes: &'a [RemoteDescriptor],
    configured: Option<&str>,
) -> Result<&'a RemoteDescriptor> {
    if let Some(name) = configured {
        return remotes
            .iter()
            .find(|remote| remote.name == name)
            .ok_or_else(|| PrcoError::RemoteNotFound(name.to_string()));
    }

    BASE_REMOTE_CANDIDATES
        .iter()
        .find_map(|candidate| remotes.iter().find(|remote| remote.name == *candidate))
        .or_else(|| remotes.first())
        .ok_or_else(|| PrcoError::RemoteNotFound("no GitHub remotes configured".to_string()))
}

/// The remote for the repository a pull request URL names.
///
/// The host must match too: the same `owner/repo` on another instance is a
/// different repository.
pub fn remote_for_repository<'a>(
    remotes: &'a [RemoteDescriptor],
    host: &str,
    owner_login: &str,
    repo_name: &str,
) -> Result<&'a RemoteDescriptor> {
    remotes
        .iter()
        .find(|remote| {
            remote.host.eq_ignore_ascii_case(host) && remote.points_at(owner_login, repo_name)
        })
        .ok_or_else(|| {
            PrcoError::RemoteNotFound(format!(
                "no remote points at {}/{}/{}",
                host, owner_login, repo_name
            ))
        })
}

/// Find a remote already pointing at the pull request's head repository.
///
/// Matching is case-insensitive on owner and repository name. The first match
/// in slice order wins.
pub fn find_head_remote<'a>(
    remotes: &'a [RemoteDescriptor],
    pr: &PullRequestHeadInfo,
) -> Option<&'a RemoteDescriptor> {
    if pr.head_repo_name.is_empty() {
        return None;
    }

    let found = remotes
        .iter()
        .find(|remote| remote.points_at(&pr.head_owner_login, &pr.head_repo_name));
    log::debug!(
        "Remote for {}/{}: {:?}",
        pr.head_owner_login,
        pr.head_repo_name,
        found.map(|remote| &remote.name)
    );
    found
}
