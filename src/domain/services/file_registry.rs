#[cfg(test)]
#[path = "file_registry_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::AssistantsApi;
use crate::domain::models::FileObject;
use crate::domain::models::FilePurpose;

pub struct FileRegistry<'a> {
    api: &'a dyn AssistantsApi,
}

impl<'a> FileRegistry<'a> {
    pub fn new(api: &'a dyn AssistantsApi) -> FileRegistry<'a> {
        return FileRegistry { api };
    }

    pub async fn list(&self) -> Result<Vec<FileObject>> {
        return self.api.list_files().await;
    }

    /// Uploads a local file and returns the id the vendor assigned to it.
    pub async fn upload(&self, file_path: &path::Path, purpose: FilePurpose) -> Result<String> {
        if !file_path.is_file() {
            bail!(format!("{} is not a file", file_path.display()));
        }

        let file = self.api.upload_file(file_path, purpose).await?;
        tracing::info!(
            file_id = file.id,
            path = %file_path.display(),
            purpose = %purpose,
            "Uploaded file"
        );

        return Ok(file.id);
    }

    pub async fn delete(&self, file_id: &str) -> Result<String> {
        self.api.delete_file(file_id).await?;
        return Ok(format!("File with ID {file_id} has been deleted."));
    }
}
