//! Repository fixtures shared by the integration tests

use prco::github::PullRequestHeadInfo;
use std::path::Path;
use std::process::Command;

pub const REPO_URL: &str = "https://github.com/OWNER/REPO.git";

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git should be installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare `origin.git` holding `main`, `feature` and `refs/pull/7/head`, and a
/// clone `local` whose origin URL looks like GitHub but resolves to the bare repo
pub fn setup() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let path = root.path();

    git(path, &["init", "-q", "--bare", "origin.git"]);
    git(&path.join("origin.git"), &["symbolic-ref", "HEAD", "refs/heads/main"]);

    git(path, &["init", "-q", "seed"]);
    let seed = path.join("seed");
    git(&seed, &["checkout", "-q", "-b", "main"]);
    git(&seed, &["commit", "-q", "--allow-empty", "-m", "base"]);
    git(&seed, &["push", "-q", "../origin.git", "main"]);
    git(&seed, &["checkout", "-q", "-b", "feature"]);
    git(&seed, &["commit", "-q", "--allow-empty", "-m", "feature work"]);
    git(
        &seed,
        &["push", "-q", "../origin.git", "feature", "feature:refs/pull/7/head"],
    );

    git(path, &["clone", "-q", "origin.git", "local"]);
    let local = path.join("local");
    let origin_path = path.join("origin.git");
    git(&local, &["config", "remote.origin.url", REPO_URL]);
    git(
        &local,
        &[
            "config",
            &format!("url.{}.insteadOf", origin_path.display()),
            REPO_URL,
        ],
    );

    root
}

pub fn push_to_pull_request(root: &Path, message: &str) -> String {
    let seed = root.join("seed");
    git(&seed, &["commit", "-q", "--allow-empty", "-m", message]);
    git(
        &seed,
        &["push", "-q", "../origin.git", "feature", "feature:refs/pull/7/head"],
    );
    git(&seed, &["rev-parse", "HEAD"])
}

pub fn pull_request(cross: bool) -> PullRequestHeadInfo {
    PullRequestHeadInfo {
        number: 7,
        head_branch_name: "feature".to_string(),
        head_owner_login: if cross { "hubot" } else { "OWNER" }.to_string(),
        head_repo_name: "REPO".to_string(),
        base_default_branch: Some("main".to_string()),
        is_cross_repository: cross,
        maintainer_can_modify: false,
    }
}
