//! Image references embedded in a note body.
//!
//! Two syntaxes are recognized: wiki embeds (`![[name]]`, `![[name|300]]`)
//! and markdown images (`![alt](path)`). Remote markdown images are left to
//! the mail client and never uploaded.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

static WIKI_EMBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[\[([^\]|]+?)(?:\|[^\]]*?)?\]\]").unwrap());

static MARKDOWN_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Path as written in the note, percent-decoded for markdown images.
    pub filename:       String,
    /// The full embed text the reference was found in.
    pub original_match: String,
}

/// Collects local image references, wiki embeds first, then markdown images.
///
/// The first reference to a filename wins; later duplicates are dropped.
pub fn parse_image_references(text: &str) -> Vec<ImageReference> {
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    let wiki = WIKI_EMBED.captures_iter(text).map(|caps| ImageReference {
        filename:       caps[1].trim().to_string(),
        original_match: caps[0].to_string(),
    });

    let markdown = MARKDOWN_IMAGE.captures_iter(text).filter_map(|caps| {
        let path = caps[2].trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            return None;
        }
        Some(ImageReference {
            filename:       decode_path(path),
            original_match: caps[0].to_string(),
        })
    });

    for reference in wiki.chain(markdown) {
        if reference.filename.is_empty() {
            continue;
        }
        if seen.insert(reference.filename.clone()) {
            references.push(reference);
        }
    }
    references
}

fn decode_path(path: &str) -> String {
    match percent_decode_str(path).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path.to_string(),
    }
}
