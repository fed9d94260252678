// Runtime settings, read from the environment the same way the API client
// picks up its base URL. Everything has a default so a bare run just works.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_API_URL;
use crate::envfile::DEFAULT_ENV_FILE;

pub const DEFAULT_PROJECT_NAME: &str = "expense-manager";
pub const DEFAULT_KEY_WAIT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// Management API host, without the `/v1` suffix.
    pub api_url: String,
    /// When set, the organization lookup is skipped.
    pub organization_id: Option<String>,
    pub env_file: PathBuf,
    pub default_project_name: String,
    /// Delay between creating the project and asking for its keys.
    pub key_wait: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.into(),
            organization_id: None,
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
            default_project_name: DEFAULT_PROJECT_NAME.into(),
            key_wait: Duration::from_secs(DEFAULT_KEY_WAIT_SECS),
        }
    }
}

impl Config {
    /// Build the configuration from `SUPABASE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let key_wait = match var("SUPABASE_KEY_WAIT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().with_context(|| {
                format!(
                    "SUPABASE_KEY_WAIT_SECS must be a whole number of seconds, got {:?}",
                    raw
                )
            })?),
            None => defaults.key_wait,
        };

        Ok(Config {
            api_url: var("SUPABASE_API_URL").unwrap_or(defaults.api_url),
            organization_id: var("SUPABASE_ORG_ID"),
            env_file: var("SUPABASE_ENV_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.env_file),
            default_project_name: var("SUPABASE_PROJECT_NAME")
                .unwrap_or(defaults.default_project_name),
            key_wait,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.api_url, "https://api.supabase.com");
        assert_eq!(cfg.organization_id, None);
        assert_eq!(cfg.env_file, PathBuf::from(".env.local"));
        assert_eq!(cfg.default_project_name, "expense-manager");
        assert_eq!(cfg.key_wait, Duration::from_secs(5));
    }

    #[test]
    fn overrides_are_applied_and_blanks_ignored() {
        let cfg = config_from(&[
            ("SUPABASE_API_URL", "http://localhost:9999"),
            ("SUPABASE_ORG_ID", "  "),
            ("SUPABASE_ENV_FILE", "web/.env"),
            ("SUPABASE_KEY_WAIT_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "http://localhost:9999");
        assert_eq!(cfg.organization_id, None);
        assert_eq!(cfg.env_file, PathBuf::from("web/.env"));
        assert_eq!(cfg.key_wait, Duration::ZERO);
    }

    #[test]
    fn bad_wait_is_rejected() {
        let err = config_from(&[("SUPABASE_KEY_WAIT_SECS", "five")]).unwrap_err();
        assert!(err.to_string().contains("SUPABASE_KEY_WAIT_SECS"));
    }
}
