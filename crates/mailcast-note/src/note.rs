//! Frontmatter-carrying markdown notes.
//!
//! A note opens with an optional YAML block fenced by `---` lines. The block
//! is kept as an untyped mapping so keys this crate does not know about
//! survive a write-back; [`BroadcastFrontmatter`] is a typed view over it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{NoteError, Result};

const FENCE: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastStatus {
    Draft,
    Send,
}

impl fmt::Display for BroadcastStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastStatus::Draft => write!(f, "draft"),
            BroadcastStatus::Send => write!(f, "send"),
        }
    }
}

impl std::str::FromStr for BroadcastStatus {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(BroadcastStatus::Draft),
            "send" => Ok(BroadcastStatus::Send),
            other => Err(NoteError::InvalidStatus(other.to_string())),
        }
    }
}

/// Broadcast keys as they appear in a note's frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BroadcastFrontmatter {
    pub id:              Option<u64>,
    pub subject:         Option<String>,
    pub tenant_email_id: Option<u64>,
    pub tag_ids:         Option<Vec<u64>>,
    pub scheduled_at:    Option<String>,
    pub status:          Option<String>,
    pub url:             Option<String>,
    pub created_at:      Option<String>,
    pub updated_at:      Option<String>,
}

/// Frontmatter that carries every key a submission needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFrontmatter {
    pub id:              Option<u64>,
    pub subject:         String,
    pub tenant_email_id: u64,
    pub tag_ids:         Vec<u64>,
    pub scheduled_at:    String,
    pub status:          BroadcastStatus,
}

impl BroadcastFrontmatter {
    /// Empty strings and a zero sender id count as missing. Every missing
    /// key is reported in one error.
    pub fn validate(&self) -> Result<ValidatedFrontmatter> {
        let subject = self.subject.as_deref().filter(|s| !s.is_empty());
        let tenant_email_id = self.tenant_email_id.filter(|id| *id != 0);
        let scheduled_at = self.scheduled_at.as_deref().filter(|s| !s.is_empty());
        let status = self.status.as_deref().filter(|s| !s.is_empty());

        let mut missing = Vec::new();
        if subject.is_none() {
            missing.push("subject");
        }
        if tenant_email_id.is_none() {
            missing.push("tenant_email_id");
        }
        if scheduled_at.is_none() {
            missing.push("scheduled_at");
        }
        if status.is_none() {
            missing.push("status");
        }

        match (subject, tenant_email_id, scheduled_at, status) {
            (Some(subject), Some(tenant_email_id), Some(scheduled_at), Some(status)) => Ok(ValidatedFrontmatter {
                id: self.id,
                subject: subject.to_string(),
                tenant_email_id,
                tag_ids: self.tag_ids.clone().unwrap_or_default(),
                scheduled_at: scheduled_at.to_string(),
                status: status.parse()?,
            }),
            _ => Err(NoteError::MissingFields(missing)),
        }
    }
}

/// What the server reported for a stored broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt<'a> {
    pub id:         u64,
    pub url:        Option<&'a str>,
    pub created_at: Option<&'a str>,
    pub updated_at: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    meta: Mapping,
    /// Text after the closing fence, untouched.
    rest: String,
}

impl Note {
    pub fn parse(text: &str) -> Result<Self> {
        let Some((yaml, rest)) = split(text) else {
            return Ok(Self {
                meta: Mapping::new(),
                rest: text.to_string(),
            });
        };

        if yaml.trim().is_empty() {
            return Ok(Self {
                meta: Mapping::new(),
                rest: rest.to_string(),
            });
        }
        let meta = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(NoteError::NotAMapping),
        };
        Ok(Self {
            meta,
            rest: rest.to_string(),
        })
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| NoteError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&text)
    }

    pub fn body(&self) -> &str { self.rest.trim_start() }

    pub fn meta(&self) -> &Mapping { &self.meta }

    pub fn frontmatter(&self) -> Result<BroadcastFrontmatter> {
        Ok(serde_yaml::from_value(Value::Mapping(self.meta.clone()))?)
    }

    /// Stores the server id and timestamps. Absent values leave the
    /// existing keys alone.
    pub fn record(&mut self, receipt: &Receipt<'_>) {
        self.meta.insert("id".into(), receipt.id.into());
        for (key, value) in [
            ("url", receipt.url),
            ("created_at", receipt.created_at),
            ("updated_at", receipt.updated_at),
        ] {
            if let Some(value) = value {
                self.meta.insert(key.into(), value.into());
            }
        }
    }

    /// Sets one frontmatter key, adding the block if the note has none.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) { self.meta.insert(key.into(), value.into()); }

    pub fn set_status(&mut self, status: BroadcastStatus) { self.set("status", status.to_string()); }

    pub fn render(&self) -> Result<String> {
        if self.meta.is_empty() {
            return Ok(self.rest.clone());
        }
        let yaml = serde_yaml::to_string(&self.meta)?;
        Ok(format!("{FENCE}\n{yaml}{FENCE}\n{}", self.rest))
    }

    /// Replaces `path` by writing a sibling temp file and renaming it over.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let text = self.render()?;
        let tmp = temp_sibling(path);
        let write_err = |source| NoteError::Write {
            path: path.to_path_buf(),
            source,
        };

        tokio::fs::write(&tmp, text).await.map_err(write_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(e));
        }
        debug!(path = %path.display(), "note written");
        Ok(())
    }
}

/// Splits `text` into the frontmatter source and whatever follows the
/// closing fence. `None` when the note has no complete frontmatter block.
fn split(text: &str) -> Option<(&str, &str)> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != FENCE {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == FENCE {
            return Some((&text[start..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
