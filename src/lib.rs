//! Check out GitHub pull requests as local branches that track the right upstream.
//!
//! A reference (`123`, a pull request URL or `owner:branch`) is resolved
//! through the GitHub CLI, the local repository is probed once, and
//! [`core::plan_checkout`] decides which git commands to run.

pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod git;
pub mod github;
pub mod parser;
pub mod remotes;
