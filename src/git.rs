use crate::{
    config::{get_optional_string, Config},
    core::Operation,
    errors::{PrcoError, Result},
    parser::{parse_remote_url, RepoUrl},
    remotes::RemoteDescriptor,
};
use git2::{BranchType, ErrorCode, Repository};
use std::path::{Path, PathBuf};
use std::process::Command;

/// What the repository currently looks like, as far as checkout cares
pub trait RepoContext {
    /// Checked-out branch name, `None` when HEAD is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;
    /// Remotes whose URL names a `host/owner/repo`, sorted by name
    fn remotes(&self) -> Result<Vec<RemoteDescriptor>>;
    fn branch_exists(&self, name: &str) -> Result<bool>;
    /// `branch.<name>.merge`, if set
    fn branch_merge_ref(&self, name: &str) -> Result<Option<String>>;
}

/// Runs one planned operation and returns its captured stdout
pub trait Executor {
    fn run(&self, operation: &Operation) -> Result<String>;
}

/// Snapshot of a local branch taken before planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalBranchState {
    pub exists: bool,
    pub is_current_branch: bool,
    pub existing_merge_ref: Option<String>,
}

/// Probe `name` once. The merge ref is only read when asked for and the branch exists.
pub fn probe_local_branch<R: RepoContext>(
    repo: &R,
    name: &str,
    with_merge_ref: bool,
) -> Result<LocalBranchState> {
    let exists = repo.branch_exists(name)?;
    let is_current_branch = repo.current_branch()?.as_deref() == Some(name);
    let existing_merge_ref = if exists && with_merge_ref {
        repo.branch_merge_ref(name)?
    } else {
        None
    };

    let state = LocalBranchState {
        exists,
        is_current_branch,
        existing_merge_ref,
    };
    log::debug!("Local state of {}: {:?}", name, state);
    Ok(state)
}

pub struct Git {
    pub repository: Repository,
    pub config: Config,
}

impl Git {
    /// Open the repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repository = Repository::discover(path)?;
        let config = Config::from_git(&repository.config()?)?;
        Ok(Self { repository, config })
    }

    /// Where git commands should run
    pub fn workdir(&self) -> PathBuf {
        self.repository
            .workdir()
            .unwrap_or_else(|| self.repository.path())
            .to_path_buf()
    }
}

impl RepoContext for Git {
    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repository.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|name| name.to_string()))
    }

    fn remotes(&self) -> Result<Vec<RemoteDescriptor>> {
        let config = self.repository.config()?;
        let names = self.repository.remotes()?;
        let mut remotes = Vec::new();

        for name in names.iter().flatten() {
            // Raw config value, so `url.*.insteadOf` rewrites don't hide the GitHub URL
            let Some(url) = get_optional_string(&config, &format!("remote.{}.url", name))? else {
                continue;
            };
            match parse_remote_url(&url) {
                Some(RepoUrl { host, owner, repo }) => {
                    remotes.push(RemoteDescriptor::new(name, &host, &owner, &repo))
                }
                None => log::debug!("Skipping remote {} ({}): not a hosted repository", name, url),
            }
        }

        remotes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(remotes)
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repository.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn branch_merge_ref(&self, name: &str) -> Result<Option<String>> {
        let config = self.repository.config()?;
        get_optional_string(&config, &format!("branch.{}.merge", name))
    }
}

/// Runs operations through the `git` executable
pub struct GitCommandExecutor {
    pub workdir: PathBuf,
}

impl GitCommandExecutor {
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl Executor for GitCommandExecutor {
    fn run(&self, operation: &Operation) -> Result<String> {
        log::debug!("Running {}", operation);

        // Divergence is recognized from git's English messages
        let output = Command::new("git")
            .args(operation.args())
            .current_dir(&self.workdir)
            .env("LC_ALL", "C")
            .env("LANGUAGE", "C")
            .output()
            .map_err(|e| PrcoError::ToolInvocation {
                command: operation.to_string(),
                message: format!("Failed to execute git: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(failure(operation, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Error for a failed operation. A rejected fast-forward means local history diverged.
pub fn failure(operation: &Operation, message: String) -> PrcoError {
    match operation {
        Operation::FastForwardMerge { target }
            if message.to_lowercase().contains("not possible to fast-forward") =>
        {
            PrcoError::DivergentHistory {
                target: target.clone(),
                message,
            }
        }
        _ => PrcoError::ToolInvocation {
            command: operation.to_string(),
            message,
        },
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::{failure, Executor, RepoContext};
    use crate::{core::Operation, errors::Result, remotes::RemoteDescriptor};
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct MockState {
        branches: BTreeSet<String>,
        current_branch: Option<String>,
        config: BTreeMap<String, String>,
        ran: Vec<Operation>,
    }

    /// In-memory repository that also executes operations against itself
    pub(crate) struct MockRepository {
        pub remotes: Vec<RemoteDescriptor>,
        state: Mutex<MockState>,
        failures: Vec<(String, String)>,
    }

    impl MockRepository {
        pub fn new(remotes: Vec<RemoteDescriptor>) -> Self {
            Self {
                remotes,
                state: Mutex::new(MockState::default()),
                failures: Vec::new(),
            }
        }

        pub fn with_branch(self, name: &str) -> Self {
            self.state.lock().unwrap().branches.insert(name.to_string());
            self
        }

        pub fn with_current_branch(self, name: &str) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.branches.insert(name.to_string());
                state.current_branch = Some(name.to_string());
            }
            self
        }

        pub fn with_config(self, key: &str, value: &str) -> Self {
            self.state
                .lock()
                .unwrap()
                .config
                .insert(key.to_string(), value.to_string());
            self
        }

        /// Make the operation rendering as `command` fail with `message`
        pub fn fail_on(mut self, command: &str, message: &str) -> Self {
            self.failures.push((command.to_string(), message.to_string()));
            self
        }

        pub fn get_ran_commands(&self) -> Vec<String> {
            self.state
                .lock()
                .unwrap()
                .ran
                .iter()
                .map(|operation| operation.to_string())
                .collect()
        }

        pub fn clear_ran_commands(&self) {
            self.state.lock().unwrap().ran.clear();
        }

        pub fn get_config(&self, key: &str) -> Option<String> {
            self.state.lock().unwrap().config.get(key).cloned()
        }
    }

    impl RepoContext for MockRepository {
        fn current_branch(&self) -> Result<Option<String>> {
            Ok(self.state.lock().unwrap().current_branch.clone())
        }

        fn remotes(&self) -> Result<Vec<RemoteDescriptor>> {
            let mut remotes = self.remotes.clone();
            remotes.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(remotes)
        }

        fn branch_exists(&self, name: &str) -> Result<bool> {
            Ok(self.state.lock().unwrap().branches.contains(name))
        }

        fn branch_merge_ref(&self, name: &str) -> Result<Option<String>> {
            Ok(self.get_config(&format!("branch.{}.merge", name)))
        }
    }

    impl Executor for MockRepository {
        fn run(&self, operation: &Operation) -> Result<String> {
            let command = operation.to_string();
            if let Some((_, message)) = self.failures.iter().find(|(c, _)| *c == command) {
                return Err(failure(operation, message.clone()));
            }

            let mut state = self.state.lock().unwrap();
            state.ran.push(operation.clone());

            match operation {
                Operation::Fetch { refspec, .. } => {
                    // A destination outside refs/ is a local branch the fetch writes directly
                    if let Some((_, destination)) = refspec.split_once(':') {
                        if !destination.starts_with("refs/") {
                            state.branches.insert(destination.to_string());
                        }
                    }
                }
                Operation::FetchToDetachedHead { .. } | Operation::FastForwardMerge { .. } => {}
                Operation::CreateBranch { name, .. } => {
                    state.branches.insert(name.clone());
                    state.current_branch = Some(name.clone());
                }
                Operation::SwitchToBranch { name } => {
                    if !state.branches.contains(name) {
                        return Err(failure(
                            operation,
                            format!("error: pathspec '{}' did not match any file(s) known to git", name),
                        ));
                    }
                    state.current_branch = Some(name.clone());
                }
                Operation::SetBranchRemoteConfig { branch, remote } => {
                    state
                        .config
                        .insert(format!("branch.{}.remote", branch), remote.clone());
                }
                Operation::SetBranchMergeConfig { branch, merge_ref } => {
                    state
                        .config
                        .insert(format!("branch.{}.merge", branch), merge_ref.clone());
                }
            }

            Ok(String::new())
        }
    }
}
