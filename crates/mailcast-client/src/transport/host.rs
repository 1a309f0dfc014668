use std::future::Future;

use bytes::Bytes;
use tracing::debug;

use super::{Method, Request, Response, Transport};
use crate::error::{Result, SubmissionError};

/// What a host request primitive receives.
#[derive(Debug, Clone)]
pub struct HostRequest {
    pub method:  Method,
    pub url:     String,
    pub headers: Vec<(String, String)>,
    pub body:    Option<Bytes>,
}

/// A resolved (2xx) response from the host primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostResponse {
    pub status: u16,
    pub text:   String,
}

/// Ways a host primitive raises instead of resolving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The server answered with a non-2xx status.
    #[error("request failed with HTTP {status}")]
    Status { status: u16, text: String },

    /// DNS, connect, TLS or socket failure.
    #[error("{0}")]
    Network(String),
}

/// A single-call request function supplied by the embedding environment.
///
/// Unlike [`SocketTransport`](super::SocketTransport) it raises on non-2xx
/// statuses. [`HostTransport`] folds that back into a plain [`Response`].
pub trait RequestPrimitive: Send + Sync {
    fn request(
        &self,
        request: HostRequest,
    ) -> impl Future<Output = std::result::Result<HostResponse, HostError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HostTransport<P> {
    primitive: P,
}

impl<P: RequestPrimitive> HostTransport<P> {
    pub fn new(primitive: P) -> Self { Self { primitive } }

    pub fn primitive(&self) -> &P { &self.primitive }
}

impl<P: RequestPrimitive> Transport for HostTransport<P> {
    async fn send(&self, request: Request) -> Result<Response> {
        let method = request.method;
        let host_request = HostRequest {
            method,
            url: request.url.clone(),
            headers: request
                .headers()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            body: request.body.map(|b| b.into_bytes()),
        };
        debug!(%method, url = %host_request.url, "dispatching through host primitive");

        match self.primitive.request(host_request).await {
            Ok(response) => Response::from_text(method, response.status, &response.text),
            Err(HostError::Status { status, text }) => Response::from_text(method, status, &text),
            Err(HostError::Network(message)) => Err(SubmissionError::Transport(message)),
        }
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use reqwest::Client;

    /// Request primitive backed by `reqwest`, raising on non-2xx like a
    /// sandboxed host function would.
    #[derive(Debug, Clone)]
    pub struct ReqwestPrimitive {
        client: Client,
    }

    impl ReqwestPrimitive {
        pub fn new() -> std::result::Result<Self, reqwest::Error> {
            let client = Client::builder().build()?;
            Ok(Self { client })
        }

        pub fn with_client(client: Client) -> Self { Self { client } }
    }

    impl RequestPrimitive for ReqwestPrimitive {
        async fn request(&self, request: HostRequest) -> std::result::Result<HostResponse, HostError> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Patch => reqwest::Method::PATCH,
            };

            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| HostError::Network(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| HostError::Network(e.to_string()))?;

            if status.is_success() {
                Ok(HostResponse {
                    status: status.as_u16(),
                    text,
                })
            } else {
                Err(HostError::Status {
                    status: status.as_u16(),
                    text,
                })
            }
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestPrimitive;

#[cfg(test)]
mod tests {
    use super::*;
    use mailcast_multipart::Form;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedPrimitive {
        reply: std::result::Result<HostResponse, HostError>,
        seen:  Mutex<Vec<HostRequest>>,
    }

    impl ScriptedPrimitive {
        fn new(reply: std::result::Result<HostResponse, HostError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RequestPrimitive for ScriptedPrimitive {
        async fn request(&self, request: HostRequest) -> std::result::Result<HostResponse, HostError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn test_resolved_response_is_parsed() {
        let transport = HostTransport::new(ScriptedPrimitive::new(Ok(HostResponse {
            status: 201,
            text:   r#"{"id":9}"#.into(),
        })));
        let body = Form::new().text("subject", "s").encode_with_boundary("B");

        let response = transport
            .send(Request::write(Method::Post, "http://h/broadcast_mails", "tok", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, Some(json!({"id": 9})));

        let seen = transport.primitive().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].body.as_deref(), Some(body.as_bytes()));
        assert!(seen[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer tok".to_string())));
    }

    #[tokio::test]
    async fn test_raised_status_is_normalized() {
        let transport = HostTransport::new(ScriptedPrimitive::new(Err(HostError::Status {
            status: 422,
            text:   r#"{"errors":["subject is required"]}"#.into(),
        })));
        let body = Form::new().encode_with_boundary("B");

        let response = transport
            .send(Request::write(Method::Patch, "http://h/broadcast_mails/1", "tok", body))
            .await
            .unwrap();
        assert_eq!(response.status, 422);
        assert_eq!(response.body, Some(json!({"errors": ["subject is required"]})));
    }

    #[tokio::test]
    async fn test_network_failure_is_transport_error() {
        let transport = HostTransport::new(ScriptedPrimitive::new(Err(HostError::Network(
            "dns lookup failed".into(),
        ))));

        let err = transport
            .send(Request::read("http://nowhere/tenant_emails", "tok"))
            .await
            .unwrap_err();
        assert_eq!(err, SubmissionError::Transport("dns lookup failed".into()));
    }

    #[tokio::test]
    async fn test_raised_status_on_read_without_json_fails() {
        let transport = HostTransport::new(ScriptedPrimitive::new(Err(HostError::Status {
            status: 500,
            text:   "Internal Server Error".into(),
        })));

        let err = transport
            .send(Request::read("http://h/tenant_emails", "tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
    }
}
