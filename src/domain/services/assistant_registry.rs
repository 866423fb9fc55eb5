#[cfg(test)]
#[path = "assistant_registry_test.rs"]
mod tests;

use anyhow::Result;

use crate::domain::models::Assistant;
use crate::domain::models::AssistantTemplate;
use crate::domain::models::AssistantUpdate;
use crate::domain::models::AssistantsApi;

pub struct AssistantRegistry<'a> {
    api: &'a dyn AssistantsApi,
}

impl<'a> AssistantRegistry<'a> {
    pub fn new(api: &'a dyn AssistantsApi) -> AssistantRegistry<'a> {
        return AssistantRegistry { api };
    }

    pub async fn create(&self, template: &AssistantTemplate) -> Result<Assistant> {
        let assistant = self.api.create_assistant(template).await?;
        tracing::info!(assistant_id = assistant.id, "Created assistant");
        return Ok(assistant);
    }

    pub async fn list(&self) -> Result<Vec<Assistant>> {
        return self.api.list_assistants().await;
    }

    pub async fn load(&self, assistant_id: &str) -> Result<Assistant> {
        return self.api.retrieve_assistant(assistant_id).await;
    }

    /// Pretty printed JSON of everything the vendor knows about the assistant.
    pub async fn details(&self, assistant_id: &str) -> Result<String> {
        let assistant = self.load(assistant_id).await?;
        return Ok(serde_json::to_string_pretty(&assistant)?);
    }

    pub async fn add_file(&self, assistant_id: &str, file_id: &str) -> Result<Assistant> {
        let assistant = self.load(assistant_id).await?;
        let mut file_ids = assistant.file_ids;
        file_ids.push(file_id.to_string());

        return self
            .api
            .update_assistant(assistant_id, &AssistantUpdate::with_file_ids(file_ids))
            .await;
    }

    /// Drops references to files that no longer exist remotely. Returns the
    /// ids that were removed.
    pub async fn clean_missing_files(&self, assistant_id: &str) -> Result<Vec<String>> {
        let assistant = self.load(assistant_id).await?;
        if assistant.file_ids.is_empty() {
            return Ok(vec![]);
        }

        let existing = self
            .api
            .list_files()
            .await?
            .into_iter()
            .map(|file| return file.id)
            .collect::<Vec<String>>();

        let (kept, missing): (Vec<String>, Vec<String>) = assistant
            .file_ids
            .into_iter()
            .partition(|file_id| return existing.contains(file_id));

        if missing.is_empty() {
            return Ok(missing);
        }

        tracing::info!(
            assistant_id = assistant_id,
            missing = ?missing,
            "Removing missing files from assistant"
        );
        self.api
            .update_assistant(assistant_id, &AssistantUpdate::with_file_ids(kept))
            .await?;

        return Ok(missing);
    }

    pub async fn update(&self, assistant_id: &str, update: &AssistantUpdate) -> Result<Assistant> {
        return self.api.update_assistant(assistant_id, update).await;
    }

    pub async fn delete(&self, assistant_id: &str) -> Result<String> {
        self.api.delete_assistant(assistant_id).await?;
        return Ok(format!("Assistant {assistant_id} deleted successfully."));
    }
}
