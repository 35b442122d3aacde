// Reference and remote URL parsing

use crate::errors::{PrcoError, Result};
use regex::Regex;

/// What the user asked to check out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrReference {
    /// `123`
    Number(u64),
    /// `https://github.com/OWNER/REPO/pull/123`
    Url {
        host: String,
        owner: String,
        repo: String,
        number: u64,
    },
    /// `owner:branch` or a bare `branch`
    Branch {
        owner: Option<String>,
        branch: String,
    },
}

/// Host, owner and repository name extracted from a remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrl {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

pub fn parse_reference(input: &str) -> Result<PrReference> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PrcoError::Parse("empty pull request reference".to_string()));
    }

    if let Ok(number) = input.parse::<u64>() {
        if number > 0 {
            return Ok(PrReference::Number(number));
        }
    }

    if let Some(reference) = parse_pull_request_url(input) {
        return Ok(reference);
    }
    if input.contains("://") {
        return Err(PrcoError::Parse(format!(
            "'{}' is not a pull request URL",
            input
        )));
    }

    // Colons are not valid in branch names, so the first one splits owner from branch
    let (owner, branch) = match input.split_once(':') {
        Some((owner, branch)) => (Some(owner.trim()).filter(|o| !o.is_empty()), branch.trim()),
        None => (None, input),
    };

    if branch.is_empty() {
        return Err(PrcoError::Parse(format!(
            "'{}' does not name a pull request branch",
            input
        )));
    }

    Ok(PrReference::Branch {
        owner: owner.map(|o| o.to_string()),
        branch: branch.to_string(),
    })
}

fn parse_pull_request_url(input: &str) -> Option<PrReference> {
    let url_re = Regex::new(
        r"^https?://(?P<host>[^/:]+)(?::\d+)?/(?P<owner>[^/]+)/(?P<repo>[^/]+)/pull/(?P<number>\d+)(?:[/?#].*)?$",
    )
    .ok()?;
    let caps = url_re.captures(input)?;
    let number = caps.name("number")?.as_str().parse::<u64>().ok()?;

    Some(PrReference::Url {
        host: caps.name("host")?.as_str().to_lowercase(),
        owner: caps.name("owner")?.as_str().to_string(),
        repo: caps.name("repo")?.as_str().to_string(),
        number,
    })
}

/// Parse https, ssh and scp-like remote URLs.
///
/// Local paths and anything without an `owner/repo` tail give `None`.
pub fn parse_remote_url(url: &str) -> Option<RepoUrl> {
    let remote_re = Regex::new(
        r"^(?:[a-z+]+://)?(?:[^@/]+@)?(?P<host>[^/:@]+)(?::\d+)?[:/](?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
    )
    .ok()?;
    let caps = remote_re.captures(url.trim())?;

    Some(RepoUrl {
        host: caps.name("host")?.as_str().to_lowercase(),
        owner: caps.name("owner")?.as_str().to_string(),
        repo: caps.name("repo")?.as_str().to_string(),
    })
}
