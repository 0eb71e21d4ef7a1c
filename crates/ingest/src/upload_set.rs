//! Upload-set construction and transfer-name sanitizing.

use std::path::{Path, PathBuf};

use crate::metadata::UploadSetKind;

/// One file to transfer for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEntry {
    pub path: PathBuf,
    /// Sanitized name the file is stored under.
    pub transfer_name: String,
    /// Position in the set; sent to the staging side only for multi-file sets.
    pub index: usize,
}

/// Ordered files to transfer for one job; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSet {
    entries: Vec<UploadEntry>,
}

impl UploadSet {
    /// Builds the set for `kind`: `[content]` or `[json, content]`.
    ///
    /// `json` is only consulted for [`UploadSetKind::TwoFiles`].
    pub fn build(
        signature: &str,
        kind: UploadSetKind,
        json: Option<&Path>,
        content: &Path,
    ) -> Self {
        let mut files: Vec<&Path> = Vec::with_capacity(2);
        if let (UploadSetKind::TwoFiles, Some(json)) = (kind, json) {
            files.push(json);
        }
        files.push(content);

        let entries = files
            .into_iter()
            .enumerate()
            .map(|(index, path)| UploadEntry {
                path: path.to_path_buf(),
                transfer_name: transfer_name(signature, path),
                index,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries must be tagged with their index.
    pub fn is_multi(&self) -> bool {
        self.entries.len() > 1
    }
}

/// File extension of `path` including the leading dot, or `""`.
pub fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// `signature + extension(path)`, sanitized.
pub fn transfer_name(signature: &str, path: &Path) -> String {
    sanitize_file_name(&format!("{signature}{}", extension(path)))
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
