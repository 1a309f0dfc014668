use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{NoteError, Result};
use crate::images::ImageReference;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// File name of the located file, used as the upload filename.
    pub filename: String,
    pub data:     Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub images:  Vec<ResolvedImage>,
    /// References that matched no file, as written in the note.
    pub missing: Vec<String>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool { self.missing.is_empty() }
}

/// Finds referenced images inside a vault directory.
///
/// Lookup order for each reference: relative to the note, relative to the
/// vault root, then any file in the vault with the same file name (the
/// shortest path wins). Candidates outside the vault are ignored.
#[derive(Debug, Clone)]
pub struct VaultResolver {
    root: PathBuf,
}

impl VaultResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    pub async fn resolve(&self, references: &[ImageReference], note_path: &Path) -> Result<Resolution> {
        let root = self.root.canonicalize().map_err(|source| NoteError::Read {
            path: self.root.clone(),
            source,
        })?;
        let note_dir = note_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.clone());

        let mut resolution = Resolution::default();
        for reference in references {
            let Some(path) = locate(&root, &note_dir, &reference.filename) else {
                warn!(image = %reference.filename, "image not found in vault");
                resolution.missing.push(reference.filename.clone());
                continue;
            };

            debug!(image = %reference.filename, path = %path.display(), "image resolved");
            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| NoteError::Read {
                    path: path.clone(),
                    source,
                })?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| reference.filename.clone());

            resolution.images.push(ResolvedImage {
                filename,
                data: Bytes::from(data),
            });
        }
        Ok(resolution)
    }
}

fn locate(root: &Path, note_dir: &Path, filename: &str) -> Option<PathBuf> {
    [note_dir.join(filename), root.join(filename)]
        .into_iter()
        .find_map(|candidate| inside(root, &candidate))
        .or_else(|| search_by_name(root, filename))
}

/// The canonical form of `candidate` when it is a file under `root`.
fn inside(root: &Path, candidate: &Path) -> Option<PathBuf> {
    let canonical = candidate.canonicalize().ok()?;
    (canonical.is_file() && canonical.starts_with(root)).then_some(canonical)
}

fn search_by_name(root: &Path, filename: &str) -> Option<PathBuf> {
    let name = Path::new(filename).file_name()?;

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == name)
        .min_by_key(|entry| entry.depth())
        .map(DirEntry::into_path)
}

fn is_hidden(entry: &DirEntry) -> bool { entry.file_name().to_string_lossy().starts_with('.') }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::parse_image_references;
    use std::fs;

    fn vault() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("posts/assets")).unwrap();
        fs::create_dir_all(root.join("attachments/old")).unwrap();
        fs::create_dir_all(root.join(".trash")).unwrap();

        fs::write(root.join("posts/assets/local.png"), b"local").unwrap();
        fs::write(root.join("banner.png"), b"root").unwrap();
        fs::write(root.join("attachments/logo.png"), b"shallow").unwrap();
        fs::write(root.join("attachments/old/logo.png"), b"deep").unwrap();
        fs::write(root.join(".trash/gone.png"), b"trash").unwrap();
        dir
    }

    async fn resolve(root: &Path, text: &str) -> Resolution {
        let refs = parse_image_references(text);
        VaultResolver::new(root)
            .resolve(&refs, &root.join("posts/sale.md"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_relative_to_note() {
        let dir = vault();
        let res = resolve(dir.path(), "![x](assets/local.png)").await;
        assert_eq!(res.images[0].filename, "local.png");
        assert_eq!(res.images[0].data.as_ref(), b"local");
        assert!(res.is_complete());
    }

    #[tokio::test]
    async fn test_relative_to_root() {
        let dir = vault();
        let res = resolve(dir.path(), "![[banner.png]]").await;
        assert_eq!(res.images[0].data.as_ref(), b"root");
    }

    #[tokio::test]
    async fn test_search_prefers_shallowest() {
        let dir = vault();
        let res = resolve(dir.path(), "![[logo.png]]").await;
        assert_eq!(res.images[0].data.as_ref(), b"shallow");
    }

    #[tokio::test]
    async fn test_reports_every_missing_image() {
        let dir = vault();
        let res = resolve(dir.path(), "![[a.png]] ![[banner.png]] ![b](b.png) ![[gone.png]]").await;

        assert_eq!(res.images.len(), 1);
        assert_eq!(res.missing, ["a.png", "gone.png", "b.png"]);
        assert!(!res.is_complete());
    }

    #[tokio::test]
    async fn test_paths_outside_vault_are_ignored() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.png"), b"no").unwrap();
        let vault_dir = outer.path().join("vault");
        fs::create_dir_all(vault_dir.join("posts")).unwrap();

        let res = resolve(&vault_dir, "![[../secret.png]]").await;
        assert_eq!(res.missing, ["../secret.png"]);
    }

    #[tokio::test]
    async fn test_missing_vault_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = VaultResolver::new(dir.path().join("absent"))
            .resolve(&[], Path::new("note.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, NoteError::Read { .. }));
    }
}
