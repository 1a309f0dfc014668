//! Byte-exact `multipart/form-data` encoding.
//!
//! # Architecture
//!
//! - [`form`] - Field, attachment and encoded-body types
//! - [`encode`] - Pure encoder producing one contiguous buffer
//! - [`decode`] - Reference decoder used to verify encoded bodies
//!
//! The encoder never scans payloads for the boundary token. Tokens are random
//! and long enough that a collision is an accepted risk.

pub use decode::{Part, decode};
pub use encode::{BOUNDARY_PREFIX, encode, encode_with_boundary, generate_boundary};
pub use error::{DecodeError, Result};
pub use form::{EncodedBody, FileAttachment, Form, FormField, OCTET_STREAM};

pub mod decode;
pub mod encode;
mod error;
pub mod form;
