//! Markdown notes as broadcast documents.
//!
//! - [`note`] - Frontmatter split, typed view, validation and write-back
//! - [`images`] - Image references embedded in the note body
//! - [`resolve`] - Locating referenced images inside a vault directory

pub use error::{NoteError, Result};
pub use images::{ImageReference, parse_image_references};
pub use note::{BroadcastFrontmatter, BroadcastStatus, Note, Receipt, ValidatedFrontmatter};
pub use resolve::{Resolution, ResolvedImage, VaultResolver};

mod error;
pub mod images;
pub mod note;
pub mod resolve;
