#[cfg(test)]
#[path = "run_waiter_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use tokio::time;

use crate::domain::models::AssistantsApi;
use crate::domain::models::NewMessage;
use crate::domain::models::PollPolicy;
use crate::domain::models::Run;
use crate::domain::models::RunStatus;
use crate::domain::models::ThreadMessage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitProgress {
    /// A status check came back, terminal or not.
    Polled { attempt: u32, status: RunStatus },
    /// The run has been pending for a while. Waiting continues.
    Reminder { attempt: u32 },
}

pub struct Completion {
    pub run: Run,
    /// Every message of the thread, oldest first.
    pub messages: Vec<ThreadMessage>,
}

/// Submits a user message to a thread, starts a run for an assistant, and
/// polls the run until it reaches a terminal status.
pub struct RunWaiter<'a> {
    api: &'a dyn AssistantsApi,
    policy: PollPolicy,
}

impl<'a> RunWaiter<'a> {
    pub fn new(api: &'a dyn AssistantsApi, policy: PollPolicy) -> RunWaiter<'a> {
        return RunWaiter { api, policy };
    }

    pub async fn submit_and_wait<F>(
        &self,
        thread_id: &str,
        assistant_id: &str,
        text: &str,
        file_ids: &[String],
        on_progress: F,
    ) -> Result<Completion>
    where
        F: FnMut(WaitProgress),
    {
        if text.trim().is_empty() {
            bail!("Cannot send an empty message");
        }

        self.api
            .create_message(thread_id, &NewMessage::user(text, file_ids))
            .await?;

        let run = self.api.create_run(thread_id, assistant_id).await?;
        tracing::debug!(
            thread_id = thread_id,
            run_id = run.id,
            attachments = file_ids.len(),
            "Created run"
        );

        return self.wait(thread_id, &run.id, on_progress).await;
    }

    pub async fn wait<F>(&self, thread_id: &str, run_id: &str, mut on_progress: F) -> Result<Completion>
    where
        F: FnMut(WaitProgress),
    {
        let started = time::Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let run = self.api.retrieve_run(thread_id, run_id).await?;
            tracing::debug!(run_id = run_id, attempt = attempt, status = %run.status, "Polled run");
            on_progress(WaitProgress::Polled {
                attempt,
                status: run.status,
            });

            if run.status.is_success() {
                let mut messages = self.api.list_messages(thread_id).await?;
                messages.sort_by_key(|message| return message.created_at);
                return Ok(Completion { run, messages });
            }

            match run.status {
                RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired => {
                    tracing::error!(run_id = run_id, status = %run.status, error = ?run.last_error, "Run did not complete");
                    bail!(run.describe_failure());
                }
                RunStatus::RequiresAction => {
                    self.cancel(thread_id, run_id).await;
                    bail!(format!(
                        "Run {run_id} requires tool outputs, which are not supported. The run was cancelled."
                    ));
                }
                _ => {}
            }

            if self.policy.is_exhausted(attempt, started.elapsed()) {
                self.cancel(thread_id, run_id).await;
                bail!(format!(
                    "Gave up waiting for run {run_id} after {attempt} status checks ({}s). The run was cancelled.",
                    started.elapsed().as_secs()
                ));
            }

            if self.policy.is_reminder(attempt) {
                tracing::warn!(run_id = run_id, attempt = attempt, "Run is taking a while");
                on_progress(WaitProgress::Reminder { attempt });
            }

            time::sleep(self.policy.delay(attempt)).await;
        }
    }

    async fn cancel(&self, thread_id: &str, run_id: &str) {
        if let Err(err) = self.api.cancel_run(thread_id, run_id).await {
            tracing::warn!(run_id = run_id, err = ?err, "Failed to cancel run");
        }
    }
}
