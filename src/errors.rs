use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrcoError {
    #[error("no pull requests found for {0}")]
    NotFound(String),

    #[error("pull request #{0} has no head repository; it was probably deleted")]
    AmbiguousHeadRepo(u64),

    #[error("`{command}` failed: {message}")]
    ToolInvocation { command: String, message: String },

    #[error("cannot fast-forward to {target}: {message}")]
    DivergentHistory { target: String, message: String },

    #[error("GitHub CLI operation failed: {0}")]
    GitHubCli(String),

    #[error("GitHub CLI not found")]
    GitHubCliNotFound,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Remote '{0}' not found")]
    RemoteNotFound(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrcoError>;
