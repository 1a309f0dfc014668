//! Broadcast mail submission pipeline.
//!
//! # Architecture
//!
//! - [`transport`] - One HTTP exchange per call, behind the [`Transport`] trait
//!   with a raw-socket strategy and a host-primitive strategy
//! - [`classify`] - Maps `(status, body)` to a result or a typed failure
//! - [`cache`] - Time-bounded memoization of small option lists
//! - [`service`] - Encode, send, classify for create and update
//! - [`options`] - Reference lists (tenant emails) fetched through the cache
//! - [`config`] - Settings file and environment overrides
//!
//! Nothing here retries. Every failure reaches the caller as a
//! [`SubmissionError`].

pub use cache::{OPTIONS_TTL, OptionsCache};
pub use classify::classify;
pub use config::{Host, Settings, TransportKind};
pub use data::{SelectOption, SubmissionResult, TenantEmail};
pub use endpoint::Endpoint;
pub use error::{ConfigError, Result, SubmissionError};
pub use options::{OptionsClient, TENANT_EMAILS};
pub use service::{BroadcastDraft, IMAGE_FIELD, Operation, SubmissionService, TAG_FIELD, image_attachment};
pub use transport::{HostError, HostRequest, HostResponse, HostTransport, Method, Request, RequestPrimitive, Response, SocketTransport, Transport};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestPrimitive;

pub mod cache;
pub mod classify;
pub mod config;
mod data;
mod endpoint;
mod error;
pub mod options;
pub mod service;
pub mod transport;
