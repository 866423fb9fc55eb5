#[cfg(test)]
#[path = "upload_candidates_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;

/// macOS Finder metadata, never worth uploading.
const IGNORED_FILE_NAME: &str = ".DS_Store";

pub struct UploadCandidates {
    pub root: path::PathBuf,
}

impl UploadCandidates {
    pub fn new(root: path::PathBuf) -> UploadCandidates {
        return UploadCandidates { root };
    }

    /// Every regular file below `root`, recursively, sorted by path.
    pub async fn collect(&self) -> Result<Vec<path::PathBuf>> {
        if !self.root.is_dir() {
            bail!(format!(
                "Upload directory {} does not exist",
                self.root.display()
            ));
        }

        let mut files: Vec<path::PathBuf> = vec![];
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                    continue;
                }

                if file_type.is_file() && entry.file_name() != IGNORED_FILE_NAME {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        tracing::debug!(root = %self.root.display(), count = files.len(), "Collected upload candidates");

        return Ok(files);
    }
}
