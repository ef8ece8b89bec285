//! Resilient request executor.
//!
//! Turns one logical call into up to `max_retries + 1` physical attempts:
//! authorize the request, send it through the injected transport, classify
//! the response, and either return the body, schedule a retry, or surface a
//! terminal error.

use crate::context::CallContext;
use crate::error::{ApiError, LinkupError};
use crate::retry::{
    classify_status, parse_retry_after, run_with_retry, Attempt, JitterSource, Outcome,
    RetryPolicy, RetryableFailure, StatusClass,
};
use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
pub use crate::transport::ERROR_BODY_LIMIT;
use std::io::Read;
use std::sync::Arc;

/// Executes logical calls against a transport. Shareable across threads; all
/// state is immutable.
pub struct Executor {
    credential: String,
    user_agent: String,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    jitter: Arc<dyn JitterSource>,
}

impl Executor {
    pub fn new(
        credential: impl Into<String>,
        user_agent: impl Into<String>,
        policy: RetryPolicy,
        transport: Arc<dyn Transport>,
        jitter: Arc<dyn JitterSource>,
    ) -> Self {
        Self {
            credential: credential.into(),
            user_agent: user_agent.into(),
            policy,
            transport,
            jitter,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Execute `request`, retrying 429/5xx and transport failures per policy.
    ///
    /// On success returns the response body byte-for-byte. Fails with
    /// `LinkupError::Config` before any network attempt when the credential
    /// is empty.
    pub fn execute(&self, request: &HttpRequest, ctx: &CallContext) -> Result<Vec<u8>, LinkupError> {
        if self.credential.is_empty() {
            return Err(LinkupError::Config("API key is empty".to_string()));
        }
        let mut request = request.clone();
        request.set_header("Authorization", &format!("Bearer {}", self.credential));
        request.set_header("User-Agent", &self.user_agent);

        run_with_retry(&self.policy, self.jitter.as_ref(), ctx, |attempt| {
            self.attempt(&request, ctx, attempt)
        })
    }

    fn attempt(&self, request: &HttpRequest, ctx: &CallContext, attempt: &Attempt) -> Outcome<Vec<u8>> {
        tracing::debug!(
            "{} {} attempt {} (after {:?})",
            request.method,
            request.url,
            attempt.index,
            attempt.delay
        );
        let response = match self.transport.send(request, ctx) {
            Ok(response) => response,
            Err(TransportError::InvalidRequest(msg)) => {
                return Outcome::Terminal(LinkupError::Config(format!("invalid request: {}", msg)))
            }
            Err(e) if e.is_cancelled() || ctx.is_done() => {
                return Outcome::Terminal(LinkupError::Cancelled)
            }
            Err(e) if attempt.is_last() => return Outcome::Terminal(LinkupError::Transport(e)),
            Err(e) => return Outcome::Retryable(RetryableFailure::transport(e)),
        };

        let status = response.status;
        match classify_status(status) {
            StatusClass::Success => read_success(response, ctx),
            StatusClass::Unauthorized => Outcome::Terminal(LinkupError::Unauthorized),
            StatusClass::Forbidden => Outcome::Terminal(LinkupError::Forbidden),
            StatusClass::Retryable if !attempt.is_last() => {
                let retry_after = parse_retry_after(response.header("Retry-After"));
                Outcome::Retryable(RetryableFailure::status(status, retry_after))
            }
            StatusClass::Retryable | StatusClass::Terminal => {
                Outcome::Terminal(decode_error_body(response))
            }
        }
    }
}

fn read_success(mut response: HttpResponse, ctx: &CallContext) -> Outcome<Vec<u8>> {
    let mut body = Vec::new();
    match response.body.read_to_end(&mut body) {
        Ok(_) => Outcome::Success(body),
        Err(_) if ctx.is_done() => Outcome::Terminal(LinkupError::Cancelled),
        Err(e) => Outcome::Terminal(LinkupError::Transport(TransportError::Io(e))),
    }
}

/// Read at most `ERROR_BODY_LIMIT` bytes and look for a structured error.
fn decode_error_body(response: HttpResponse) -> LinkupError {
    let status = response.status;
    let mut prefix = Vec::new();
    // A truncated or unreadable body just means no structured message.
    let _ = response.body.take(ERROR_BODY_LIMIT).read_to_end(&mut prefix);
    match ApiError::from_body(status, &prefix) {
        Some(api) => LinkupError::Api(api),
        None => LinkupError::Http { status },
    }
}
