//! `LinkupClient`: endpoint methods on top of the executor.

use crate::context::CallContext;
use crate::error::LinkupError;
use crate::executor::Executor;
use crate::models::{Balance, FetchRequest, RawResponse, SearchRequest};
use crate::retry::{JitterSource, RetryPolicy, ThreadRngJitter};
use crate::transport::{CurlTransport, HttpRequest, Method, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.linkup.so/v1";
pub const DEFAULT_USER_AGENT: &str = concat!("linkup-rs/", env!("CARGO_PKG_VERSION"));
/// Per-request timeout used when no transport is supplied.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client construction options. Every field is optional; unset fields take
/// the defaults above.
#[derive(Clone, Default)]
pub struct ClientOptions {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub retry: Option<RetryPolicy>,
    /// Per-request timeout for the default curl transport. Ignored when
    /// `transport` is set.
    pub timeout: Option<Duration>,
    pub transport: Option<Arc<dyn Transport>>,
    pub jitter: Option<Arc<dyn JitterSource>>,
}

/// Blocking client for the Linkup API. Cheap to share by reference across
/// threads; every call takes its own `CallContext`.
pub struct LinkupClient {
    base_url: String,
    executor: Executor,
}

impl LinkupClient {
    /// Build a client. An empty `api_key` is accepted here and rejected on
    /// the first call, before any network attempt.
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Result<Self, LinkupError> {
        let base_url = normalize_base_url(options.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let user_agent = options
            .user_agent
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout = options.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let transport: Arc<dyn Transport> = match options.transport {
            Some(transport) => transport,
            None => Arc::new(CurlTransport::with_timeout(timeout)),
        };
        let jitter: Arc<dyn JitterSource> = match options.jitter {
            Some(jitter) => jitter,
            None => Arc::new(ThreadRngJitter),
        };
        let policy = options.retry.unwrap_or_default();
        tracing::debug!(
            "linkup client: base_url={} max_retries={} backoff={:?}..{:?}",
            base_url,
            policy.max_retries(),
            policy.min_backoff(),
            policy.max_backoff()
        );
        Ok(Self {
            base_url,
            executor: Executor::new(api_key, user_agent, policy, transport, jitter),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        self.executor.user_agent()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// `POST /search`, returning the raw JSON payload.
    pub fn search(&self, ctx: &CallContext, req: &SearchRequest) -> Result<RawResponse, LinkupError> {
        self.post_json("/search", req, ctx)
    }

    /// `POST /search`, decoded into `T`. Decode failures are `LinkupError::Decode`.
    pub fn search_structured<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        req: &SearchRequest,
    ) -> Result<T, LinkupError> {
        self.search(ctx, req)?.decode_into()
    }

    /// `POST /fetch`, returning the raw JSON payload (usually markdown inside).
    pub fn fetch(&self, ctx: &CallContext, req: &FetchRequest) -> Result<RawResponse, LinkupError> {
        if req.url.is_empty() {
            return Err(LinkupError::Config("fetch url is empty".to_string()));
        }
        self.post_json("/fetch", req, ctx)
    }

    /// `GET /credits/balance`.
    pub fn balance(&self, ctx: &CallContext) -> Result<Balance, LinkupError> {
        let request = HttpRequest::new(Method::Get, self.endpoint("/credits/balance"));
        let body = self.executor.execute(&request, ctx)?;
        RawResponse::new(body).decode_into()
    }

    fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: &CallContext,
    ) -> Result<RawResponse, LinkupError> {
        let body = serde_json::to_vec(body).map_err(LinkupError::Encode)?;
        let request = HttpRequest::new(Method::Post, self.endpoint(path))
            .with_header("Content-Type", "application/json")
            .with_body(body);
        self.executor.execute(&request, ctx).map(RawResponse::new)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Strip trailing slashes and make sure what is left is an absolute URL.
fn normalize_base_url(raw: &str) -> Result<String, LinkupError> {
    let trimmed = raw.trim().trim_end_matches('/');
    url::Url::parse(trimmed)
        .map_err(|e| LinkupError::Config(format!("invalid base URL {:?}: {}", raw, e)))?;
    Ok(trimmed.to_string())
}
