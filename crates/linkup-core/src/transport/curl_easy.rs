//! libcurl transport.
//!
//! One `Easy2` handle per request, driven through a `Multi` so the call
//! context is checked every `POLL_INTERVAL` while the request is in flight.
//! The total timeout is the smaller of the configured timeout and whatever is
//! left of the call's deadline. Non-2xx bodies are buffered only up to
//! `error_body_limit`; the transfer stops once the cap is reached.

use super::{HttpRequest, HttpResponse, Method, Transport, TransportError, ERROR_BODY_LIMIT};
use crate::context::CallContext;
use curl::easy::{Easy2, Handler, List, WriteError};
use curl::multi::Multi;
use std::io::Cursor;
use std::str;
use std::time::Duration;

/// Upper bound on how long a cancelled or expired call keeps its request open.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Blocking HTTP transport backed by the `curl` crate.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    /// Upper bound for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Upper bound for the whole request (further capped by the call deadline).
    pub timeout: Duration,
    /// Bytes of a non-2xx body kept in memory.
    pub error_body_limit: usize,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
            error_body_limit: ERROR_BODY_LIMIT as usize,
        }
    }
}

impl CurlTransport {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Collects status, header lines and (bounded) body for one transfer.
struct Collector {
    header_lines: Vec<String>,
    status: Option<u16>,
    body: Vec<u8>,
    error_body_limit: usize,
    /// Set when a non-2xx body hit the cap and the transfer was stopped.
    capped: bool,
}

impl Collector {
    fn new(error_body_limit: usize) -> Self {
        Self {
            header_lines: Vec::new(),
            status: None,
            body: Vec::new(),
            error_body_limit,
            capped: false,
        }
    }

    fn body_limit(&self) -> usize {
        match self.status {
            Some(s) if (200..300).contains(&s) => usize::MAX,
            _ => self.error_body_limit,
        }
    }
}

impl Handler for Collector {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if let Some(status) = parse_status_line(line) {
                // New response (redirect, 100 Continue): drop the previous block.
                self.header_lines.clear();
                self.status = Some(status);
            } else if !line.is_empty() {
                self.header_lines.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let room = self.body_limit().saturating_sub(self.body.len());
        if data.len() > room {
            self.body.extend_from_slice(&data[..room]);
            self.capped = true;
            // Short count makes curl stop the transfer.
            return Ok(0);
        }
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}

/// `HTTP/1.1 429 Too Many Requests` -> 429.
fn parse_status_line(line: &str) -> Option<u16> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Split raw header lines into name/value pairs.
fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Setting up the handle failed; the same request can never succeed.
fn invalid(e: curl::Error) -> TransportError {
    TransportError::InvalidRequest(e.to_string())
}

/// Classify a curl error for the executor. Anything caused by the call
/// context is `Cancelled`, including a timeout that the deadline imposed.
fn classify_curl_error(e: &curl::Error, ctx: &CallContext, deadline_bound: bool) -> TransportError {
    if e.is_aborted_by_callback() || ctx.is_done() {
        return TransportError::Cancelled;
    }
    if e.is_operation_timedout() {
        if deadline_bound {
            return TransportError::Cancelled;
        }
        return TransportError::Timeout(e.to_string());
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return TransportError::Resolve(e.to_string());
    }
    if e.is_couldnt_connect()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportError::Connect(e.to_string());
    }
    TransportError::Other(e.to_string())
}

impl CurlTransport {
    fn prepare(&self, request: &HttpRequest, timeout: Duration) -> Result<Easy2<Collector>, TransportError> {
        let mut easy = Easy2::new(Collector::new(self.error_body_limit));
        easy.url(&request.url).map_err(invalid)?;
        match request.method {
            Method::Get => easy.get(true).map_err(invalid)?,
            Method::Post => {
                easy.post(true).map_err(invalid)?;
                easy.post_fields_copy(request.body.as_deref().unwrap_or_default())
                    .map_err(invalid)?;
            }
        }
        easy.connect_timeout(self.connect_timeout.min(timeout)).map_err(invalid)?;
        easy.timeout(timeout).map_err(invalid)?;

        let mut list = List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim())).map_err(invalid)?;
        }
        easy.http_headers(list).map_err(invalid)?;
        Ok(easy)
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &HttpRequest, ctx: &CallContext) -> Result<HttpResponse, TransportError> {
        if ctx.is_done() {
            return Err(TransportError::Cancelled);
        }
        let (timeout, deadline_bound) = match ctx.remaining() {
            Some(left) if left.is_zero() => return Err(TransportError::Cancelled),
            Some(left) if left < self.timeout => (left, true),
            _ => (self.timeout, false),
        };
        // libcurl reads a zero timeout as "no timeout".
        let timeout = timeout.max(Duration::from_millis(1));
        let easy = self.prepare(request, timeout)?;

        let multi = Multi::new();
        let handle = multi
            .add2(easy)
            .map_err(|e| TransportError::Other(format!("curl multi add: {}", e)))?;
        let mut finished: Option<Result<(), curl::Error>> = None;
        loop {
            if ctx.is_done() {
                let _ = multi.remove2(handle);
                tracing::debug!("{} {} cancelled in flight", request.method, request.url);
                return Err(TransportError::Cancelled);
            }
            let running = multi
                .perform()
                .map_err(|e| TransportError::Other(format!("curl multi perform: {}", e)))?;
            multi.messages(|msg| {
                if let Some(res) = msg.result_for2(&handle) {
                    finished = Some(res);
                }
            });
            if finished.is_some() || running == 0 {
                break;
            }
            multi
                .wait(&mut [], POLL_INTERVAL)
                .map_err(|e| TransportError::Other(format!("curl multi wait: {}", e)))?;
        }

        let mut easy = multi
            .remove2(handle)
            .map_err(|e| TransportError::Other(format!("curl multi remove: {}", e)))?;
        let capped = easy.get_ref().capped;
        match finished {
            Some(Ok(())) => {}
            // Stopped on purpose after buffering the capped error body.
            Some(Err(e)) if capped && e.is_write_error() => {}
            Some(Err(e)) => {
                let err = classify_curl_error(&e, ctx, deadline_bound);
                tracing::debug!("{} {} failed: {}", request.method, request.url, err);
                return Err(err);
            }
            None => return Err(TransportError::Other("curl transfer ended without a result".to_string())),
        }

        let status = match easy.get_ref().status {
            Some(status) => status,
            None => {
                let code = easy
                    .response_code()
                    .map_err(|e| TransportError::Other(e.to_string()))?;
                u16::try_from(code)
                    .map_err(|_| TransportError::Other(format!("invalid HTTP status {}", code)))?
            }
        };
        let collector = easy.get_mut();
        let headers = parse_header_lines(&collector.header_lines);
        let body = std::mem::take(&mut collector.body);
        Ok(HttpResponse::new(status, headers, Cursor::new(body)))
    }
}
