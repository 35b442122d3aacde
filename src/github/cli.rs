use crate::errors::{PrcoError, Result};
use crate::github::types::{
    GraphQlResponse, PullRequestHeadInfo, PullRequestRepository, PullRequestsRepository,
    RepositoryData,
};
use serde::de::DeserializeOwned;
use std::process::Command;

const PULL_REQUEST_FIELDS: &str = "
    number
    headRefName
    headRepositoryOwner { login }
    headRepository { name }
    isCrossRepository
    maintainerCanModify";

/// Read access to pull request metadata
pub trait GitHubCli {
    fn is_available(&self) -> Result<bool>;
    /// Pull request `number` of `owner/repo` on the GitHub instance at `host`
    fn pull_request(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestHeadInfo>;
    /// Open pull requests of `owner/repo` whose head branch is `head_branch`,
    /// in the service's default order
    fn open_pull_requests(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        head_branch: &str,
    ) -> Result<Vec<PullRequestHeadInfo>>;
}

pub struct GitHubCliImpl;

impl GitHubCliImpl {
    pub fn new() -> Self {
        Self
    }

    fn run_command(&self, args: &[&str]) -> Result<std::process::Output> {
        let output = Command::new("gh")
            .args(args)
            .env("GH_PROMPT_DISABLED", "1")
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PrcoError::GitHubCliNotFound,
                _ => PrcoError::GitHubCli(format!("Failed to execute gh command: {}", e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(api_error(stderr.trim()));
        }

        Ok(output)
    }

    fn graphql<T: DeserializeOwned>(
        &self,
        host: &str,
        query: &str,
        variables: &[(&str, String)],
    ) -> Result<T> {
        let query_arg = format!("query={}", query);
        let variable_args: Vec<String> = variables
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();

        let mut args = vec!["api", "graphql", "--hostname", host, "-f", query_arg.as_str()];
        for variable in &variable_args {
            // -F would coerce numeric-looking owners and branches; only `number` wants it
            let flag = if variable.starts_with("number=") { "-F" } else { "-f" };
            args.push(flag);
            args.push(variable);
        }

        log::debug!("gh api graphql --hostname {} {:?}", host, variables);
        let output = self.run_command(&args)?;
        let response: GraphQlResponse<T> = serde_json::from_slice(&output.stdout)?;

        if let Some(error) = response.errors.first() {
            return Err(api_error(&error.message));
        }

        response
            .data
            .ok_or_else(|| PrcoError::GitHubCli("empty GraphQL response".to_string()))
    }
}

/// GraphQL reports unknown repositories and pull requests as "Could not resolve to a ..."
pub(crate) fn api_error(message: &str) -> PrcoError {
    if message.contains("Could not resolve") {
        PrcoError::NotFound(message.to_string())
    } else {
        PrcoError::GitHubCli(message.to_string())
    }
}

impl Default for GitHubCliImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubCli for GitHubCliImpl {
    fn is_available(&self) -> Result<bool> {
        match Command::new("gh").arg("--version").output() {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false),
        }
    }

    fn pull_request(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestHeadInfo> {
        log::debug!("Looking up pull request {}/{}/{}#{}", host, owner, repo, number);

        let query = format!(
            "query PullRequestHead($owner: String!, $repo: String!, $number: Int!) {{
                repository(owner: $owner, name: $repo) {{
                    defaultBranchRef {{ name }}
                    pullRequest(number: $number) {{ {} }}
                }}
            }}",
            PULL_REQUEST_FIELDS
        );
        let data: RepositoryData<PullRequestRepository> = self.graphql(
            host,
            &query,
            &[
                ("owner", owner.to_string()),
                ("repo", repo.to_string()),
                ("number", number.to_string()),
            ],
        )?;

        let not_found = || PrcoError::NotFound(format!("pull request #{} in {}/{}", number, owner, repo));
        let repository = data.repository.ok_or_else(not_found)?;
        let default_branch = repository.default_branch_ref.map(|r| r.name);
        let node = repository.pull_request.ok_or_else(not_found)?;

        Ok(node.into_head_info(default_branch))
    }

    fn open_pull_requests(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        head_branch: &str,
    ) -> Result<Vec<PullRequestHeadInfo>> {
        log::debug!(
            "Listing open pull requests of {}/{}/{} for branch {}",
            host,
            owner,
            repo,
            head_branch
        );

        let query = format!(
            "query PullRequestsForBranch($owner: String!, $repo: String!, $headRefName: String!) {{
                repository(owner: $owner, name: $repo) {{
                    defaultBranchRef {{ name }}
                    pullRequests(headRefName: $headRefName, states: OPEN, first: 30) {{
                        nodes {{ {} }}
                    }}
                }}
            }}",
            PULL_REQUEST_FIELDS
        );
        let data: RepositoryData<PullRequestsRepository> = self.graphql(
            host,
            &query,
            &[
                ("owner", owner.to_string()),
                ("repo", repo.to_string()),
                ("headRefName", head_branch.to_string()),
            ],
        )?;

        let Some(repository) = data.repository else {
            return Err(PrcoError::NotFound(format!("repository {}/{}", owner, repo)));
        };
        let default_branch = repository.default_branch_ref.map(|r| r.name);

        Ok(repository
            .pull_requests
            .nodes
            .into_iter()
            .map(|node| node.into_head_info(default_branch.clone()))
            .collect())
    }
}

/// In-memory pull requests keyed by base repository, recording every query
pub struct MockGitHubCli {
    pub available: bool,
    pub pull_requests: Vec<(String, PullRequestHeadInfo)>,
    pub queries: std::sync::Mutex<Vec<String>>,
}

impl MockGitHubCli {
    pub fn new() -> Self {
        Self {
            available: true,
            pull_requests: Vec::new(),
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Register a pull request opened against `base_repo` (`OWNER/REPO`)
    pub fn with_pull_request(mut self, base_repo: &str, pr: PullRequestHeadInfo) -> Self {
        self.pull_requests.push((base_repo.to_string(), pr));
        self
    }

    pub fn set_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn get_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn in_repo<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
    ) -> impl Iterator<Item = &'a PullRequestHeadInfo> + 'a {
        let full_name = format!("{}/{}", owner, repo);
        self.pull_requests
            .iter()
            .filter(move |(base, _)| base.eq_ignore_ascii_case(&full_name))
            .map(|(_, pr)| pr)
    }
}

impl Default for MockGitHubCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubCli for MockGitHubCli {
    fn is_available(&self) -> Result<bool> {
        Ok(self.available)
    }

    fn pull_request(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestHeadInfo> {
        self.queries
            .lock()
            .unwrap()
            .push(format!("pull_request {} {}/{}#{}", host, owner, repo, number));

        self.in_repo(owner, repo)
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| PrcoError::NotFound(format!("pull request #{} in {}/{}", number, owner, repo)))
    }

    fn open_pull_requests(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        head_branch: &str,
    ) -> Result<Vec<PullRequestHeadInfo>> {
        self.queries
            .lock()
            .unwrap()
            .push(format!("open_pull_requests {} {}/{} {}", host, owner, repo, head_branch));

        Ok(self
            .in_repo(owner, repo)
            .filter(|pr| pr.head_branch_name == head_branch)
            .cloned()
            .collect())
    }
}
