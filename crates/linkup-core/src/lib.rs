//! Blocking client for the Linkup search/fetch API.
//!
//! The interesting part is the executor: every endpoint call goes through a
//! retry loop that classifies each HTTP outcome (success, sentinel failure,
//! structured API error, retryable) and sleeps with jittered exponential
//! backoff between attempts, honoring the caller's deadline and cancel token.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod retry;
pub mod transport;

pub use client::{ClientOptions, LinkupClient, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use context::{CallContext, CancelToken, Cancelled};
pub use error::{ApiError, LinkupError};
pub use executor::Executor;
pub use models::{
    AnswerSource, Balance, Depth, FetchRequest, OutputType, RawResponse, SearchRequest,
    SourcedAnswer,
};
pub use retry::RetryPolicy;
pub use transport::{CurlTransport, HttpRequest, HttpResponse, Method, Transport, TransportError};
