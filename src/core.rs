use crate::{
    errors::Result,
    git::{probe_local_branch, Executor, LocalBranchState, RepoContext},
    github::{GitHubCli, PullRequestHeadInfo, PullRequestResolver},
    parser::{parse_reference, PrReference},
    remotes::{base_remote, find_head_remote, remote_for_repository, RemoteDescriptor},
};
use std::fmt;

/// One version-control step of a checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Fetch { remote: String, refspec: String },
    /// Fetch into FETCH_HEAD only
    FetchToDetachedHead { remote: String, reference: String },
    /// Create and switch to `name` at `start_point`, without tracking
    CreateBranch { name: String, start_point: String },
    SwitchToBranch { name: String },
    FastForwardMerge { target: String },
    /// `remote` is a remote name or a URL
    SetBranchRemoteConfig { branch: String, remote: String },
    SetBranchMergeConfig { branch: String, merge_ref: String },
}

impl Operation {
    /// Arguments of the `git` invocation this operation maps to
    pub fn args(&self) -> Vec<String> {
        let args: Vec<&str> = match self {
            Operation::Fetch { remote, refspec } => vec!["fetch", remote.as_str(), refspec.as_str()],
            Operation::FetchToDetachedHead { remote, reference } => {
                vec!["fetch", remote.as_str(), reference.as_str()]
            }
            Operation::CreateBranch { name, start_point } => {
                vec!["checkout", "-b", name.as_str(), "--no-track", start_point.as_str()]
            }
            Operation::SwitchToBranch { name } => vec!["checkout", name.as_str()],
            Operation::FastForwardMerge { target } => vec!["merge", "--ff-only", target.as_str()],
            Operation::SetBranchRemoteConfig { branch, remote } => {
                return vec![
                    "config".to_string(),
                    format!("branch.{}.remote", branch),
                    remote.clone(),
                ]
            }
            Operation::SetBranchMergeConfig { branch, merge_ref } => {
                return vec![
                    "config".to_string(),
                    format!("branch.{}.merge", branch),
                    merge_ref.clone(),
                ]
            }
        };
        args.into_iter().map(|arg| arg.to_string()).collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git {}", self.args().join(" "))
    }
}

/// Ordered operations producing the local branch for one pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub branch: String,
    pub operations: Vec<Operation>,
}

impl CheckoutPlan {
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }
}

impl<'a> IntoIterator for &'a CheckoutPlan {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// The mutually exclusive situations a checkout can be in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutCase {
    /// Head branch lives in the base repository
    SameRepo { remote: String },
    /// Fork, and a local remote already points at it
    CrossRepoWithRemote { remote: String },
    /// Fork without a remote, local branch not there yet
    CrossRepoNewBranch {
        base_remote: String,
        /// Fork clone URL when maintainers may push to the head branch
        push_url: Option<String>,
    },
    /// Fork without a remote, local branch exists but is not checked out
    CrossRepoExistingBranch { base_remote: String },
    /// Fork without a remote, local branch is checked out
    CrossRepoCurrentBranch { base_remote: String },
}

impl CheckoutCase {
    pub fn classify(
        pr: &PullRequestHeadInfo,
        remotes: &[RemoteDescriptor],
        base: &RemoteDescriptor,
        local: &LocalBranchState,
    ) -> Result<Self> {
        if !pr.is_cross_repository {
            return Ok(CheckoutCase::SameRepo {
                remote: base.name.clone(),
            });
        }

        let head_repo = pr.head_repo()?;
        if let Some(remote) = find_head_remote(remotes, pr) {
            return Ok(CheckoutCase::CrossRepoWithRemote {
                remote: remote.name.clone(),
            });
        }

        let base_remote = base.name.clone();
        if local.is_current_branch {
            warn_on_foreign_upstream(pr, local);
            return Ok(CheckoutCase::CrossRepoCurrentBranch { base_remote });
        }
        if local.exists {
            warn_on_foreign_upstream(pr, local);
            return Ok(CheckoutCase::CrossRepoExistingBranch { base_remote });
        }

        let push_url = pr
            .maintainer_can_modify
            .then(|| base.clone_url_for(&pr.head_owner_login, head_repo));
        Ok(CheckoutCase::CrossRepoNewBranch {
            base_remote,
            push_url,
        })
    }

    pub fn plan(&self, pr: &PullRequestHeadInfo, local: &LocalBranchState) -> CheckoutPlan {
        let branch = pr.local_branch_name();

        let operations = match self {
            CheckoutCase::SameRepo { remote } | CheckoutCase::CrossRepoWithRemote { remote } => {
                remote_branch_operations(remote, pr, &branch, local.exists)
            }
            CheckoutCase::CrossRepoNewBranch {
                base_remote,
                push_url,
            } => {
                // Tracking a URL means pulling from the fork itself, where only the head branch exists
                let (remote, merge_ref) = match push_url {
                    Some(url) => (url.clone(), format!("refs/heads/{}", pr.head_branch_name)),
                    None => (base_remote.clone(), pr.head_ref_path()),
                };
                vec![
                    Operation::Fetch {
                        remote: base_remote.clone(),
                        refspec: format!("{}:{}", pr.head_ref_path(), branch),
                    },
                    Operation::SwitchToBranch {
                        name: branch.clone(),
                    },
                    Operation::SetBranchRemoteConfig {
                        branch: branch.clone(),
                        remote,
                    },
                    Operation::SetBranchMergeConfig {
                        branch: branch.clone(),
                        merge_ref,
                    },
                ]
            }
            CheckoutCase::CrossRepoExistingBranch { base_remote } => vec![
                Operation::Fetch {
                    remote: base_remote.clone(),
                    refspec: format!("{}:{}", pr.head_ref_path(), branch),
                },
                Operation::SwitchToBranch {
                    name: branch.clone(),
                },
            ],
            // git refuses to fetch into the checked-out branch
            CheckoutCase::CrossRepoCurrentBranch { base_remote } => vec![
                Operation::FetchToDetachedHead {
                    remote: base_remote.clone(),
                    reference: pr.head_ref_path(),
                },
                Operation::FastForwardMerge {
                    target: "FETCH_HEAD".to_string(),
                },
            ],
        };

        CheckoutPlan { branch, operations }
    }
}

/// Fetch into `refs/remotes/<remote>/` and create or fast-forward the local branch from there
fn remote_branch_operations(
    remote: &str,
    pr: &PullRequestHeadInfo,
    branch: &str,
    exists: bool,
) -> Vec<Operation> {
    let head = &pr.head_branch_name;
    let fetch = Operation::Fetch {
        remote: remote.to_string(),
        refspec: format!("+refs/heads/{}:refs/remotes/{}/{}", head, remote, head),
    };

    if exists {
        return vec![
            fetch,
            Operation::SwitchToBranch {
                name: branch.to_string(),
            },
            Operation::FastForwardMerge {
                target: format!("refs/remotes/{}/{}", remote, head),
            },
        ];
    }

    vec![
        fetch,
        Operation::CreateBranch {
            name: branch.to_string(),
            start_point: format!("{}/{}", remote, head),
        },
        Operation::SetBranchRemoteConfig {
            branch: branch.to_string(),
            remote: remote.to_string(),
        },
        Operation::SetBranchMergeConfig {
            branch: branch.to_string(),
            merge_ref: format!("refs/heads/{}", head),
        },
    ]
}

fn warn_on_foreign_upstream(pr: &PullRequestHeadInfo, local: &LocalBranchState) {
    let Some(merge_ref) = &local.existing_merge_ref else {
        return;
    };
    let expected = [pr.head_ref_path(), format!("refs/heads/{}", pr.head_branch_name)];
    if !expected.contains(merge_ref) {
        log::warn!(
            "{} tracks {}, not pull request #{}",
            pr.local_branch_name(),
            merge_ref,
            pr.number
        );
    }
}

/// Decide the operations for `pr` given the remotes and a local snapshot
pub fn plan_checkout(
    pr: &PullRequestHeadInfo,
    remotes: &[RemoteDescriptor],
    base: &RemoteDescriptor,
    local: &LocalBranchState,
) -> Result<CheckoutPlan> {
    let case = CheckoutCase::classify(pr, remotes, base, local)?;
    log::debug!("Checkout case for #{}: {:?}", pr.number, case);
    Ok(case.plan(pr, local))
}

/// Run operations in order, stopping at the first failure.
///
/// Completed steps are not rolled back.
pub fn execute_plan<E: Executor>(plan: &CheckoutPlan, executor: &E) -> Result<()> {
    let total = plan.len();
    for (index, operation) in plan.iter().enumerate() {
        log::info!("[{}/{}] {}", index + 1, total, operation);
        executor.run(operation)?;
    }
    Ok(())
}

/// Resolve `reference`, probe the repository and compute the plan.
///
/// A pull request URL is planned against the remote for the repository it
/// names, never the base remote of some other repository.
pub fn prepare_checkout<R: RepoContext, T: GitHubCli>(
    reference: &str,
    repo: &R,
    resolver: &PullRequestResolver<T>,
    configured_remote: Option<&str>,
) -> Result<CheckoutPlan> {
    let reference = parse_reference(reference)?;
    let remotes = repo.remotes()?;
    let base = match &reference {
        PrReference::Url {
            host, owner, repo, ..
        } => remote_for_repository(&remotes, host, owner, repo)?,
        _ => base_remote(&remotes, configured_remote)?,
    };
    log::debug!("Base remote: {} ({}/{})", base.name, base.owner_login, base.repo_name);

    let pr = resolver.resolve_reference(&reference, base)?;
    log::info!(
        "Pull request #{}: {}:{}",
        pr.number,
        pr.head_owner_login,
        pr.head_branch_name
    );

    let branch = pr.local_branch_name();
    let local = probe_local_branch(repo, &branch, pr.is_cross_repository)?;

    plan_checkout(&pr, &remotes, base, &local)
}

/// Resolve, plan and execute a checkout
pub fn checkout<R: RepoContext, T: GitHubCli, E: Executor>(
    reference: &str,
    repo: &R,
    resolver: &PullRequestResolver<T>,
    executor: &E,
    configured_remote: Option<&str>,
) -> Result<CheckoutPlan> {
    let plan = prepare_checkout(reference, repo, resolver, configured_remote)?;
    execute_plan(&plan, executor)?;
    Ok(plan)
}
