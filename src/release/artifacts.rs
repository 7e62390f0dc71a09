//! Artifact discovery.
//!
//! Scans the artifacts directory once, keeps the files whose names match a
//! release keyword and holds them open until delivery finishes.

use crate::error::NotifierError;
use std::fs::{self, File};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A build artifact selected for publishing.
///
/// Owns an open read handle; dropping the artifact closes it.
#[derive(Debug)]
pub struct Artifact {
    key: String,
    path: PathBuf,
    file_name: String,
    file: File,
    len: u64,
}

impl Artifact {
    /// Multipart field name, `file1`, `file2`, ...
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size in bytes at the time the artifact was opened
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `attach://` reference used by the media descriptor
    #[must_use]
    pub fn attach_uri(&self) -> String {
        format!("attach://{}", self.key)
    }

    /// Returns a second handle positioned at the start of the file.
    ///
    /// The clone shares the cursor with the owned handle, so every upload
    /// attempt rewinds before reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle cannot be duplicated or rewound.
    pub fn reopen(&self) -> std::io::Result<File> {
        let mut file = self.file.try_clone()?;
        file.seek(SeekFrom::Start(0))?;
        Ok(file)
    }
}

/// Artifacts in discovery order.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Closes every handle and returns how many were released.
    pub fn close(self) -> usize {
        let count = self.artifacts.len();
        drop(self.artifacts);
        debug!("Released {} artifact handles", count);
        count
    }
}

fn matches_keyword(file_name: &str, keywords: &[String]) -> bool {
    let lower = file_name.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

/// Collects regular files directly inside `dir` whose lowercased name contains
/// any of `keywords`.
///
/// Listing order is preserved, keys are assigned sequentially from `file1`.
///
/// # Errors
///
/// Returns `NotifierError::Io` if the directory cannot be listed or a matching
/// file cannot be opened.
pub fn collect_artifacts(dir: &Path, keywords: &[String]) -> Result<ArtifactSet, NotifierError> {
    let entries = fs::read_dir(dir).map_err(|e| NotifierError::io(dir, e))?;
    let mut artifacts = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| NotifierError::io(dir, e))?;
        let path = entry.path();
        // Follows symlinks
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !matches_keyword(&file_name, keywords) {
            continue;
        }

        let file = File::open(&path).map_err(|e| NotifierError::io(&path, e))?;
        let len = file
            .metadata()
            .map_err(|e| NotifierError::io(&path, e))?
            .len();
        let key = format!("file{}", artifacts.len() + 1);

        debug!("Collected {} as {} ({} bytes)", file_name, key, len);
        artifacts.push(Artifact {
            key,
            path,
            file_name,
            file,
            len,
        });
    }

    info!(
        "Collected {} release artifacts from {}",
        artifacts.len(),
        dir.display()
    );
    Ok(ArtifactSet { artifacts })
}
