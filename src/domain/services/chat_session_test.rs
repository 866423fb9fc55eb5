use std::time::Duration;

use anyhow::Result;
use test_utils::message_fixture;

use super::ChatSession;
use crate::domain::models::PollPolicy;
use crate::domain::models::RunStatus;
use crate::domain::models::ThreadMessage;
use crate::infrastructure::api::fake::FakeApi;

#[tokio::test]
async fn it_creates_one_thread_and_reuses_it() -> Result<()> {
    let api = FakeApi::with_statuses(&[RunStatus::Completed]).reply_with("Sure.");

    let session =
        ChatSession::start(&api, "asst_1", PollPolicy::unbounded(Duration::from_millis(1)))
            .await?;
    assert_eq!(session.thread_id(), "thread_1");

    let first = session.send("First question", &[], |_| {}).await?;
    let second = session.send("Second question", &[], |_| {}).await?;

    assert_eq!(api.count_calls("create_thread"), 1);
    assert_eq!(api.count_calls("create_run"), 2);
    assert_eq!(first.run_id, "run_1");
    assert_eq!(second.run_id, "run_2");
    return Ok(());
}

#[tokio::test]
async fn it_only_returns_replies_for_the_latest_run() -> Result<()> {
    let api = FakeApi::with_statuses(&[RunStatus::Completed]).reply_with("Sure.");

    let session =
        ChatSession::start(&api, "asst_1", PollPolicy::unbounded(Duration::from_millis(1)))
            .await?;
    session.send("First question", &[], |_| {}).await?;
    let second = session.send("Second question", &[], |_| {}).await?;

    assert_eq!(second.messages.len(), 4);
    let replies = second.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].run_id, Some("run_2".to_string()));
    return Ok(());
}

#[test]
fn it_filters_replies_by_role_and_run() -> Result<()> {
    let messages: Vec<ThreadMessage> = vec![
        serde_json::from_value(message_fixture("msg_1", "user", "Hi", None))?,
        serde_json::from_value(message_fixture("msg_2", "assistant", "Old", Some("run_0")))?,
        serde_json::from_value(message_fixture("msg_3", "assistant", "One", Some("run_1")))?,
        serde_json::from_value(message_fixture("msg_4", "assistant", "Two", Some("run_1")))?,
    ];

    let replies = ChatSession::replies(&messages, "run_1")
        .iter()
        .map(|message| return message.text())
        .collect::<Vec<String>>();

    assert_eq!(replies, vec!["One", "Two"]);
    return Ok(());
}
