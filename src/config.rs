use crate::errors::Result;
use git2::ErrorCode;

/// Settings read from git config (system, global and repository layers)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub prco: PrcoConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrcoConfig {
    /// `prco.remote`: the remote whose repository pull requests are opened against
    pub base_remote: Option<String>,
}

impl Config {
    pub fn from_git(config: &git2::Config) -> Result<Self> {
        let base_remote = get_optional_string(config, "prco.remote")?.filter(|name| !name.is_empty());
        log::debug!("prco.remote = {:?}", base_remote);

        Ok(Self {
            prco: PrcoConfig { base_remote },
        })
    }
}

/// Read a string entry, mapping a missing key to `None`
pub fn get_optional_string(config: &git2::Config, key: &str) -> Result<Option<String>> {
    match config.get_string(key) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
