//! Filesystem view of the drop directory.
//!
//! Layout relative to the root:
//! - `root/`: inbound roster and document files
//! - `root/processed/`: handled files of either kind
//! - `root/invalid/`: rejected documents

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::errors::IngestError;
use crate::domain::models::{Destination, DropFile, FileKind};

#[derive(Debug, Clone)]
pub struct DropZone {
    root: PathBuf,
}

impl DropZone {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn destination_dir(&self, destination: Destination) -> PathBuf {
        self.root.join(destination.dir_name())
    }

    /// Create the root and both destination subtrees.
    pub async fn ensure_layout(&self) -> Result<(), IngestError> {
        for dir in [
            self.root.clone(),
            self.destination_dir(Destination::Processed),
            self.destination_dir(Destination::Invalid),
        ] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| IngestError::io("create directory", &dir, e))?;
        }
        Ok(())
    }

    /// List regular files directly under the root whose extension is one of
    /// `extensions` (case-insensitive, without the dot), sorted by name.
    ///
    /// A missing root yields an empty listing. Names that are not valid
    /// UTF-8 are skipped with a warning.
    pub async fn list(&self, kind: FileKind, extensions: &[String]) -> Result<Vec<DropFile>, IngestError> {
        let listing_error = |source| IngestError::Listing {
            path: self.root.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(root = %self.root.display(), "drop directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(listing_error(e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(listing_error)? {
            let file_type = entry.file_type().await.map_err(listing_error)?;
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(file = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };

            if has_extension(&name, extensions) {
                files.push(DropFile { path, name, kind });
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Move `file` into the `destination` subtree, replacing any file of the
    /// same name already there. Returns the new path.
    pub async fn relocate(&self, file: &DropFile, destination: Destination) -> Result<PathBuf, IngestError> {
        let dir = self.destination_dir(destination);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| IngestError::io("create directory", &dir, e))?;

        let target = dir.join(&file.name);
        tokio::fs::rename(&file.path, &target)
            .await
            .map_err(|e| IngestError::io("move", &file.path, e))?;

        tracing::debug!(
            file = %file.name,
            kind = %file.kind,
            destination = destination.dir_name(),
            "relocated file"
        );
        Ok(target)
    }
}

fn has_extension(name: &str, extensions: &[String]) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}
