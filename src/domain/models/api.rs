use std::path;

use anyhow::Result;
use async_trait::async_trait;

use super::Assistant;
use super::AssistantTemplate;
use super::AssistantUpdate;
use super::FileObject;
use super::FilePurpose;
use super::NewMessage;
use super::Run;
use super::Thread;
use super::ThreadMessage;

/// Every remote call the client makes against the vendor's Assistants API.
/// Services receive an implementation explicitly rather than reaching for a
/// shared client.
#[async_trait]
pub trait AssistantsApi {
    /// Used at startup to verify all configurations are available to talk to
    /// the API.
    async fn health_check(&self) -> Result<()>;

    async fn list_assistants(&self) -> Result<Vec<Assistant>>;

    async fn create_assistant(&self, template: &AssistantTemplate) -> Result<Assistant>;

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant>;

    async fn update_assistant(
        &self,
        assistant_id: &str,
        update: &AssistantUpdate,
    ) -> Result<Assistant>;

    async fn delete_assistant(&self, assistant_id: &str) -> Result<()>;

    async fn list_files(&self) -> Result<Vec<FileObject>>;

    /// Reads the file at `file_path` from disk and uploads it.
    async fn upload_file(&self, file_path: &path::Path, purpose: FilePurpose)
        -> Result<FileObject>;

    async fn delete_file(&self, file_id: &str) -> Result<()>;

    async fn create_thread(&self) -> Result<Thread>;

    async fn create_message(&self, thread_id: &str, message: &NewMessage)
        -> Result<ThreadMessage>;

    /// Returns the thread's messages ordered by creation time, oldest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;
}

pub type ApiBox = Box<dyn AssistantsApi + Send + Sync>;
