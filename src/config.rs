//! Runtime configuration: CLI flags with environment fallback.

use std::path::PathBuf;
use std::time::Duration;

use crate::{
    cli::ConfigArgs,
    core::default_data_dir,
    engine::DEFAULT_POLL_INTERVAL,
    error::{AlertError, Result},
    fpl::FPL_BASE_URL,
    API_URL_ENV_VAR, BACKEND_URL_ENV_VAR, DATA_DIR_ENV_VAR, POLL_INTERVAL_ENV_VAR, TOKEN_ENV_VAR,
};


pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertsConfig {
    pub api_url: String,
    pub backend_url: String,
    pub token: Option<String>,
    pub poll_interval: Duration,
    pub data_dir: PathBuf,
}

impl AlertsConfig {
    /// Resolve from flags, falling back to the process environment.
    pub fn resolve(args: &ConfigArgs) -> Result<Self> {
        Self::resolve_with(args, |name| std::env::var(name).ok())
    }

    /// Resolve from flags, falling back to `lookup` for environment values.
    ///
    /// Blank environment values count as unset.
    pub fn resolve_with<F>(args: &ConfigArgs, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = args
            .api_url
            .clone()
            .or_else(|| env(API_URL_ENV_VAR))
            .unwrap_or_else(|| FPL_BASE_URL.to_string());

        let backend_url = args
            .backend_url
            .clone()
            .or_else(|| env(BACKEND_URL_ENV_VAR))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let token = args.token.clone().or_else(|| env(TOKEN_ENV_VAR));

        let interval_ms = match args.interval_ms {
            Some(ms) => Some(ms),
            None => env(POLL_INTERVAL_ENV_VAR)
                .map(|raw| {
                    raw.parse::<u64>().map_err(|_| AlertError::InvalidConfig {
                        name: POLL_INTERVAL_ENV_VAR.to_string(),
                        value: raw,
                    })
                })
                .transpose()?,
        };
        let poll_interval = match interval_ms {
            Some(0) => {
                return Err(AlertError::InvalidConfig {
                    name: "poll interval".to_string(),
                    value: "0".to_string(),
                })
            }
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_POLL_INTERVAL,
        };

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| env(DATA_DIR_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_url,
            backend_url,
            token,
            poll_interval,
            data_dir,
        })
    }

    /// Auth token for the notifications backend.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| AlertError::MissingAuthToken {
                env_var: TOKEN_ENV_VAR.to_string(),
            })
    }
}
