use std::env;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub listener: Listener,
    pub github_token: Option<String>,
    pub latest_release: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}: {1}")]
    InvalidPort(String, std::num::ParseIntError),
}

impl Config {
    /// Reads configuration from the process environment. A missing credential
    /// or release id degrades the corresponding feature instead of failing
    /// startup; only an unparseable PORT is fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values behave the same as unset ones.
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|err| ConfigError::InvalidPort(raw, err))?,
            None => DEFAULT_PORT,
        };

        let github_token = get("GITHUB_TOKEN");
        if github_token.is_none() {
            tracing::warn!("GITHUB_TOKEN is not set, feedback submission will fail");
        }

        let latest_release = get("LATEST_RELEASE");
        if latest_release.is_none() {
            tracing::warn!("LATEST_RELEASE is not set, update checks will always report up to date");
        }

        Ok(Config {
            listener: Listener { host, port },
            github_token,
            latest_release,
        })
    }
}

/// Loads overrides from a local .env file if one exists. A missing file is a
/// diagnostic, not an error.
pub fn load_env_file() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env overrides"),
        Err(err) => tracing::debug!(%err, "no .env file loaded"),
    }
}
