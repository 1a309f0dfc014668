//! HTTP transport abstraction.
//!
//! A [`Transport`] performs exactly one request/response exchange and
//! normalizes it to a [`Response`]: the numeric status plus the JSON body.
//! Network-level failures (DNS, refused connection, TLS, socket errors)
//! surface uniformly as [`SubmissionError::Transport`].
//!
//! # Implementations
//!
//! - [`SocketTransport`]: HTTP/1.1 written directly onto a TCP (or TLS) stream
//! - [`HostTransport`]: adapts a host-supplied single-call request primitive

use std::future::Future;
use std::sync::Arc;

use mailcast_multipart::EncodedBody;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SubmissionError};

mod host;
mod socket;

pub use host::{HostError, HostRequest, HostResponse, HostTransport, RequestPrimitive};
pub use socket::SocketTransport;

#[cfg(feature = "reqwest")]
pub use host::ReqwestPrimitive;

/// Longest body excerpt quoted in an error message.
const SNIPPET_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }

    pub fn is_write(&self) -> bool { !matches!(self, Method::Get) }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// A single outbound call. Write requests carry a multipart body, reads do not.
#[derive(Clone)]
pub struct Request {
    pub method: Method,
    pub url:    String,
    token:      String,
    pub body:   Option<EncodedBody>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body", &self.body.as_ref().map(EncodedBody::len))
            .finish_non_exhaustive()
    }
}

impl Request {
    pub fn write(method: Method, url: impl Into<String>, token: impl Into<String>, body: EncodedBody) -> Self {
        Self {
            method,
            url: url.into(),
            token: token.into(),
            body: Some(body),
        }
    }

    pub fn read(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url:    url.into(),
            token:  token.into(),
            body:   None,
        }
    }

    /// Headers every strategy sends, in wire order. Framing headers such as
    /// `Host` and `Content-Length` are left to the strategy.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Authorization", format!("Bearer {}", self.token))];
        match &self.body {
            Some(body) => headers.push(("Content-Type", body.content_type())),
            None => headers.push(("Accept", "application/json".to_string())),
        }
        headers
    }
}

/// Status code plus the parsed body.
///
/// `body` is `None` only for write requests whose response was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body:   Option<Value>,
}

impl Response {
    /// Parses the accumulated response text.
    ///
    /// A write keeps going with a `None` body so the status can still be
    /// classified. A read has no such fallback and fails.
    pub fn from_text(method: Method, status: u16, text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(body) => Ok(Self {
                status,
                body: Some(body),
            }),
            Err(_) if method.is_write() => {
                warn!(status, %method, "response body is not JSON, continuing without it");
                Ok(Self { status, body: None })
            },
            Err(e) => Err(SubmissionError::Transport(format!(
                "invalid JSON response ({e}): {}",
                snippet(text)
            ))),
        }
    }
}

pub(crate) fn snippet(text: &str) -> String { text.chars().take(SNIPPET_LEN).collect() }

/// Sends one request and waits for the complete response.
///
/// No retries, no timeouts beyond the strategy's own defaults.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send { (**self).send(request) }
}
