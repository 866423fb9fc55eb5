#[cfg(test)]
#[path = "chat_session_test.rs"]
mod tests;

use anyhow::Result;

use super::RunWaiter;
use super::WaitProgress;
use crate::domain::models::AssistantsApi;
use crate::domain::models::PollPolicy;
use crate::domain::models::Role;
use crate::domain::models::Thread;
use crate::domain::models::ThreadMessage;

/// A conversation thread bound to a single assistant. Turns are sent one at a
/// time, so there is never more than one run in flight per thread.
pub struct ChatSession<'a> {
    api: &'a dyn AssistantsApi,
    assistant_id: String,
    thread: Thread,
    policy: PollPolicy,
}

pub struct Turn {
    pub run_id: String,
    pub messages: Vec<ThreadMessage>,
}

impl Turn {
    pub fn replies(&self) -> Vec<&ThreadMessage> {
        return ChatSession::replies(&self.messages, &self.run_id);
    }
}

impl<'a> ChatSession<'a> {
    pub async fn start(
        api: &'a dyn AssistantsApi,
        assistant_id: &str,
        policy: PollPolicy,
    ) -> Result<ChatSession<'a>> {
        let thread = api.create_thread().await?;
        tracing::info!(
            thread_id = thread.id,
            assistant_id = assistant_id,
            "Started chat session"
        );

        return Ok(ChatSession {
            api,
            assistant_id: assistant_id.to_string(),
            thread,
            policy,
        });
    }

    pub fn thread_id(&self) -> &str {
        return &self.thread.id;
    }

    pub async fn send<F>(&self, text: &str, file_ids: &[String], on_progress: F) -> Result<Turn>
    where
        F: FnMut(WaitProgress),
    {
        let waiter = RunWaiter::new(self.api, self.policy.clone());
        let completion = waiter
            .submit_and_wait(
                &self.thread.id,
                &self.assistant_id,
                text,
                file_ids,
                on_progress,
            )
            .await?;

        return Ok(Turn {
            run_id: completion.run.id,
            messages: completion.messages,
        });
    }

    /// Assistant messages produced by the given run, oldest first.
    pub fn replies<'m>(messages: &'m [ThreadMessage], run_id: &str) -> Vec<&'m ThreadMessage> {
        return messages
            .iter()
            .filter(|message| {
                return message.role == Role::Assistant
                    && message.run_id.as_deref() == Some(run_id);
            })
            .collect();
    }
}
