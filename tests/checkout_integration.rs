mod common;

use common::{git, pull_request, push_to_pull_request, setup};
use prco::core::checkout;
use prco::errors::PrcoError;
use prco::git::{Git, GitCommandExecutor, RepoContext};
use prco::github::{MockGitHubCli, PullRequestResolver};

#[test]
fn test_fork_pull_request_checkout_and_update() {
    let root = setup();
    let local = root.path().join("local");
    let git_repo = Git::open(&local).unwrap();
    let resolver = PullRequestResolver::new(
        MockGitHubCli::new().with_pull_request("OWNER/REPO", pull_request(true)),
    );
    let executor = GitCommandExecutor::new(git_repo.workdir());

    let plan = checkout("7", &git_repo, &resolver, &executor, None).unwrap();

    assert_eq!(plan.len(), 4);
    assert_eq!(git_repo.current_branch().unwrap().as_deref(), Some("pr/7/feature"));
    assert_eq!(
        git(&local, &["config", "branch.pr/7/feature.merge"]),
        "refs/pull/7/head"
    );
    assert_eq!(git(&local, &["config", "branch.pr/7/feature.remote"]), "origin");
    assert_eq!(
        git(&local, &["rev-parse", "pr/7/feature"]),
        git(&root.path().join("origin.git"), &["rev-parse", "refs/pull/7/head"])
    );

    // Still on the branch: the update goes through FETCH_HEAD
    let new_head = push_to_pull_request(root.path(), "more work");
    let plan = checkout("7", &git_repo, &resolver, &executor, None).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(git(&local, &["rev-parse", "HEAD"]), new_head);

    // Elsewhere: the fetch moves the branch directly
    git(&local, &["checkout", "-q", "main"]);
    let newer_head = push_to_pull_request(root.path(), "even more work");
    let plan = checkout("7", &git_repo, &resolver, &executor, None).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(git(&local, &["rev-parse", "pr/7/feature"]), newer_head);
    assert_eq!(git_repo.current_branch().unwrap().as_deref(), Some("pr/7/feature"));
}

#[test]
fn test_same_repo_pull_request_checkout() {
    let root = setup();
    let local = root.path().join("local");
    let git_repo = Git::open(&local).unwrap();
    let resolver = PullRequestResolver::new(
        MockGitHubCli::new().with_pull_request("OWNER/REPO", pull_request(false)),
    );
    let executor = GitCommandExecutor::new(git_repo.workdir());

    let plan = checkout("7", &git_repo, &resolver, &executor, None).unwrap();

    assert_eq!(plan.len(), 4);
    assert_eq!(git_repo.current_branch().unwrap().as_deref(), Some("pr/7/feature"));
    assert_eq!(
        git(&local, &["config", "branch.pr/7/feature.merge"]),
        "refs/heads/feature"
    );
    assert_eq!(
        git(&local, &["rev-parse", "pr/7/feature"]),
        git(&local, &["rev-parse", "refs/remotes/origin/feature"])
    );

    let new_head = push_to_pull_request(root.path(), "more work");
    let plan = checkout("7", &git_repo, &resolver, &executor, None).unwrap();

    assert_eq!(plan.len(), 3);
    assert_eq!(git(&local, &["rev-parse", "HEAD"]), new_head);
}

#[test]
fn test_diverged_branch_is_not_merged() {
    let root = setup();
    let local = root.path().join("local");
    let git_repo = Git::open(&local).unwrap();
    let resolver = PullRequestResolver::new(
        MockGitHubCli::new().with_pull_request("OWNER/REPO", pull_request(false)),
    );
    let executor = GitCommandExecutor::new(git_repo.workdir());

    checkout("7", &git_repo, &resolver, &executor, None).unwrap();
    git(&local, &["commit", "-q", "--allow-empty", "-m", "local only"]);
    let local_head = git(&local, &["rev-parse", "HEAD"]);
    push_to_pull_request(root.path(), "upstream only");

    let err = checkout("7", &git_repo, &resolver, &executor, None).unwrap_err();

    assert!(matches!(err, PrcoError::DivergentHistory { .. }), "{:?}", err);
    assert_eq!(git(&local, &["rev-parse", "HEAD"]), local_head);
}
