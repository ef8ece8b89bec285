use crate::client::{ClientOptions, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::error::LinkupError;
use crate::retry::RetryPolicy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
    /// Backoff before the first retry, in milliseconds.
    pub min_backoff_ms: u64,
    /// Upper bound on any single backoff, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff_ms: 250,
            max_backoff_ms: 4000,
        }
    }
}

impl RetryConfig {
    /// Validated policy; fails when `max_backoff_ms < min_backoff_ms`.
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        Ok(RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.min_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )?)
    }
}

/// Client configuration loaded from `~/.config/linkup/config.toml`.
///
/// The API key is deliberately not stored here; it comes from the
/// environment or the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkupConfig {
    /// API base URL (trailing slash is ignored).
    pub base_url: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for LinkupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            retry: None,
        }
    }
}

impl LinkupConfig {
    /// Client options for this config. Transport and jitter stay at their defaults.
    /// Fails on a zero `timeout_secs` or an invalid `[retry]` section.
    pub fn to_client_options(&self) -> Result<ClientOptions> {
        if self.timeout_secs == 0 {
            return Err(LinkupError::Config("timeout_secs must be at least 1".to_string()).into());
        }
        let retry = match &self.retry {
            Some(r) => r.to_policy()?,
            None => RetryPolicy::default(),
        };
        Ok(ClientOptions {
            base_url: Some(self.base_url.clone()),
            user_agent: Some(self.user_agent.clone()),
            retry: Some(retry),
            timeout: Some(Duration::from_secs(self.timeout_secs)),
            ..ClientOptions::default()
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("linkup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LinkupConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but at an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<LinkupConfig> {
    if !path.exists() {
        let default_cfg = LinkupConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: LinkupConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let cfg = LinkupConfig::default();
        assert_eq!(cfg.base_url, "https://api.linkup.so/v1");
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.retry.is_none());
        let opts = cfg.to_client_options().unwrap();
        assert_eq!(opts.retry, Some(RetryPolicy::default()));
        assert_eq!(opts.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = LinkupConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: LinkupConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.base_url, cfg.base_url);
        assert_eq!(parsed.user_agent, cfg.user_agent);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            base_url = "http://localhost:8080/v1/"
            user_agent = "custom/2.0"
            timeout_secs = 5

            [retry]
            max_retries = 1
            min_backoff_ms = 10
            max_backoff_ms = 50
        "#;
        let cfg: LinkupConfig = toml::from_str(toml).unwrap();
        let policy = cfg.retry.as_ref().unwrap().to_policy().unwrap();
        assert_eq!(policy.max_retries(), 1);
        assert_eq!(policy.min_backoff(), Duration::from_millis(10));
        assert_eq!(policy.max_backoff(), Duration::from_millis(50));
        let opts = cfg.to_client_options().unwrap();
        assert_eq!(opts.base_url.as_deref(), Some("http://localhost:8080/v1/"));
        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn config_rejects_inverted_backoff() {
        let retry = RetryConfig {
            max_retries: 2,
            min_backoff_ms: 500,
            max_backoff_ms: 100,
        };
        assert!(retry.to_policy().is_err());
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let cfg = LinkupConfig {
            timeout_secs: 0,
            ..LinkupConfig::default()
        };
        let err = cfg.to_client_options().err().unwrap();
        assert!(matches!(
            err.downcast_ref::<LinkupError>(),
            Some(LinkupError::Config(_))
        ));
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.timeout_secs, 30);

        fs::write(
            &path,
            "base_url = \"http://127.0.0.1:1\"\nuser_agent = \"t\"\ntimeout_secs = 2\n",
        )
        .unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.base_url, "http://127.0.0.1:1");
        assert_eq!(loaded.timeout_secs, 2);
    }
}
