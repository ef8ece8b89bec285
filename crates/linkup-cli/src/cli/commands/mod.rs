//! CLI command handlers, one file per command, plus the shared client setup.

mod balance;
mod completions;
mod fetch;
mod output;
mod search;

pub use balance::run_balance;
pub use completions::run_completions;
pub use fetch::run_fetch;
pub use search::run_search;
#[cfg(test)]
pub(crate) use search::build_search_request;

use super::ConnectionArgs;
use anyhow::Result;
use linkup_core::config::{self, LinkupConfig};
use linkup_core::{CallContext, LinkupClient, LinkupError};
use std::time::Duration;

/// A ready client plus the context bounding this one call.
pub(crate) struct Session {
    pub client: LinkupClient,
    pub ctx: CallContext,
}

/// Build a client from the config file overridden by command-line flags.
/// `default_timeout` applies when `--timeout` is not given.
pub(crate) fn connect(conn: &ConnectionArgs, default_timeout: Duration) -> Result<Session> {
    let api_key = conn
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| LinkupError::Config("missing LINKUP_API_KEY".to_string()))?;

    let cfg = match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("config unavailable, using defaults: {:#}", err);
            LinkupConfig::default()
        }
    };
    tracing::debug!("loaded config: {:?}", cfg);

    let mut options = cfg.to_client_options()?;
    if let Some(base) = conn.base_url.as_deref().filter(|b| !b.is_empty()) {
        options.base_url = Some(base.to_string());
    }
    if let Some(ua) = conn.user_agent.as_deref().filter(|u| !u.is_empty()) {
        options.user_agent = Some(ua.to_string());
    }

    let deadline = match conn.timeout {
        Some(secs) => timeout_from_secs(secs)?,
        None => default_timeout,
    };
    let client = LinkupClient::new(api_key, options)?;
    Ok(Session {
        client,
        ctx: CallContext::new().with_timeout(deadline),
    })
}

fn timeout_from_secs(secs: f64) -> Result<Duration, LinkupError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(LinkupError::Config(format!(
            "--timeout must be a positive number of seconds, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| LinkupError::Config(format!("--timeout {}: {}", secs, e)))
}
