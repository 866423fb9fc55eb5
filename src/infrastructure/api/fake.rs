use std::collections::VecDeque;
use std::path;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Assistant;
use crate::domain::models::AssistantTemplate;
use crate::domain::models::AssistantUpdate;
use crate::domain::models::AssistantsApi;
use crate::domain::models::FileObject;
use crate::domain::models::FilePurpose;
use crate::domain::models::MessageContent;
use crate::domain::models::NewMessage;
use crate::domain::models::Role;
use crate::domain::models::Run;
use crate::domain::models::RunError;
use crate::domain::models::RunStatus;
use crate::domain::models::TextContent;
use crate::domain::models::Thread;
use crate::domain::models::ThreadMessage;

#[derive(Default)]
pub struct FakeState {
    pub assistants: Vec<Assistant>,
    pub files: Vec<FileObject>,
    pub messages: Vec<ThreadMessage>,
    pub calls: Vec<String>,
    pub created_messages: Vec<NewMessage>,
    pub assistant_updates: Vec<(String, AssistantUpdate)>,
    pub uploads: Vec<(path::PathBuf, FilePurpose)>,
    statuses: VecDeque<RunStatus>,
    last_error: Option<RunError>,
    reply: Option<String>,
    runs: u32,
    ids: u32,
}

/// In-memory stand-in for the vendor API. Run statuses are scripted: each
/// status check pops the next one, and the last one repeats forever.
#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_statuses(statuses: &[RunStatus]) -> FakeApi {
        let api = FakeApi::default();
        api.state.lock().unwrap().statuses = statuses.iter().copied().collect();
        return api;
    }

    pub fn reply_with(self, text: &str) -> FakeApi {
        self.state.lock().unwrap().reply = Some(text.to_string());
        return self;
    }

    pub fn fail_with(self, code: &str, message: &str) -> FakeApi {
        self.state.lock().unwrap().last_error = Some(RunError {
            code: code.to_string(),
            message: message.to_string(),
        });
        return self;
    }

    pub fn add_assistant(&self, id: &str, file_ids: &[&str]) {
        let assistant: Assistant =
            serde_json::from_value(test_utils::assistant_fixture(id, file_ids)).unwrap();
        self.state.lock().unwrap().assistants.push(assistant);
    }

    pub fn add_file(&self, id: &str, filename: &str) {
        let file: FileObject =
            serde_json::from_value(test_utils::file_fixture(id, filename)).unwrap();
        self.state.lock().unwrap().files.push(file);
    }

    pub fn calls(&self) -> Vec<String> {
        return self.state.lock().unwrap().calls.clone();
    }

    pub fn count_calls(&self, name: &str) -> usize {
        return self
            .calls()
            .iter()
            .filter(|call| return call.as_str() == name)
            .count();
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.ids += 1;
        return format!("{prefix}_{}", state.ids);
    }

    fn run(&self, run_id: &str, status: RunStatus) -> Run {
        let state = self.state.lock().unwrap();
        let mut last_error = None;
        if status == RunStatus::Failed {
            last_error = state.last_error.clone();
        }

        return Run {
            id: run_id.to_string(),
            thread_id: "thread_1".to_string(),
            assistant_id: "asst_1".to_string(),
            status,
            last_error,
        };
    }
}

fn text_message(id: String, role: Role, text: &str, run_id: Option<String>) -> ThreadMessage {
    return ThreadMessage {
        id,
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
            },
        }],
        file_ids: vec![],
        created_at: 0,
        run_id,
    };
}

#[async_trait]
impl AssistantsApi for FakeApi {
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn list_assistants(&self) -> Result<Vec<Assistant>> {
        self.record("list_assistants");
        return Ok(self.state.lock().unwrap().assistants.clone());
    }

    async fn create_assistant(&self, template: &AssistantTemplate) -> Result<Assistant> {
        self.record("create_assistant");
        let assistant = Assistant {
            id: self.next_id("asst"),
            name: Some(template.name.to_string()),
            model: template.model.to_string(),
            instructions: Some(template.instructions.to_string()),
            description: Some(template.description.to_string()),
            metadata: None,
            tools: template.tools.clone(),
            file_ids: template.file_ids.clone(),
            created_at: 0,
        };
        self.state
            .lock()
            .unwrap()
            .assistants
            .push(assistant.clone());
        return Ok(assistant);
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.record("retrieve_assistant");
        let state = self.state.lock().unwrap();
        return match state.assistants.iter().find(|e| return e.id == assistant_id) {
            Some(assistant) => Ok(assistant.clone()),
            None => bail!(format!("No assistant found with id '{assistant_id}'")),
        };
    }

    async fn update_assistant(
        &self,
        assistant_id: &str,
        update: &AssistantUpdate,
    ) -> Result<Assistant> {
        self.record("update_assistant");
        let mut state = self.state.lock().unwrap();
        state
            .assistant_updates
            .push((assistant_id.to_string(), update.clone()));

        let assistant = match state
            .assistants
            .iter_mut()
            .find(|e| return e.id == assistant_id)
        {
            Some(assistant) => assistant,
            None => bail!(format!("No assistant found with id '{assistant_id}'")),
        };
        if let Some(name) = &update.name {
            assistant.name = Some(name.to_string());
        }
        if let Some(file_ids) = &update.file_ids {
            assistant.file_ids = file_ids.clone();
        }

        return Ok(assistant.clone());
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<()> {
        self.record("delete_assistant");
        self.state
            .lock()
            .unwrap()
            .assistants
            .retain(|e| return e.id != assistant_id);
        return Ok(());
    }

    async fn list_files(&self) -> Result<Vec<FileObject>> {
        self.record("list_files");
        return Ok(self.state.lock().unwrap().files.clone());
    }

    async fn upload_file(
        &self,
        file_path: &path::Path,
        purpose: FilePurpose,
    ) -> Result<FileObject> {
        self.record("upload_file");
        let file = FileObject {
            id: self.next_id("file"),
            filename: file_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            purpose: purpose.to_string(),
            bytes: 0,
            created_at: 0,
        };

        let mut state = self.state.lock().unwrap();
        state.uploads.push((file_path.to_path_buf(), purpose));
        state.files.push(file.clone());
        return Ok(file);
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.record("delete_file");
        self.state
            .lock()
            .unwrap()
            .files
            .retain(|e| return e.id != file_id);
        return Ok(());
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.record("create_thread");
        return Ok(Thread {
            id: "thread_1".to_string(),
        });
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        message: &NewMessage,
    ) -> Result<ThreadMessage> {
        self.record("create_message");
        let created = text_message(self.next_id("msg"), message.role, &message.content, None);

        let mut state = self.state.lock().unwrap();
        state.created_messages.push(message.clone());
        state.messages.push(created.clone());
        return Ok(created);
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>> {
        self.record("list_messages");
        return Ok(self.state.lock().unwrap().messages.clone());
    }

    async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<Run> {
        self.record("create_run");
        let run_id = {
            let mut state = self.state.lock().unwrap();
            state.runs += 1;
            format!("run_{}", state.runs)
        };
        return Ok(self.run(&run_id, RunStatus::Queued));
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
        self.record("retrieve_run");
        let status = {
            let mut state = self.state.lock().unwrap();
            let status = if state.statuses.len() > 1 {
                state.statuses.pop_front().unwrap()
            } else {
                state.statuses.front().copied().unwrap_or(RunStatus::Completed)
            };

            if status == RunStatus::Completed {
                if let Some(reply) = state.reply.clone() {
                    let id = format!("msg_reply_{run_id}");
                    if !state.messages.iter().any(|e| return e.id == id) {
                        state.messages.push(text_message(
                            id,
                            Role::Assistant,
                            &reply,
                            Some(run_id.to_string()),
                        ));
                    }
                }
            }

            status
        };

        return Ok(self.run(run_id, status));
    }

    async fn cancel_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
        self.record("cancel_run");
        return Ok(self.run(run_id, RunStatus::Cancelling));
    }
}
