use anyhow::Result;
use serde_json::json;
use test_utils::run_fixture;

use super::Run;
use super::RunError;
use super::RunStatus;

#[test]
fn it_parses_known_statuses() -> Result<()> {
    let run: Run = serde_json::from_value(run_fixture("run_1", "in_progress"))?;
    assert_eq!(run.status, RunStatus::InProgress);
    assert!(!run.status.is_terminal());
    return Ok(());
}

#[test]
fn it_parses_unknown_statuses() -> Result<()> {
    let run: Run = serde_json::from_value(run_fixture("run_1", "incomplete"))?;
    assert_eq!(run.status, RunStatus::Unknown);
    assert!(!run.status.is_terminal());
    return Ok(());
}

#[test]
fn it_classifies_terminal_statuses() {
    let terminal = [
        RunStatus::Completed,
        RunStatus::Failed,
        RunStatus::Cancelled,
        RunStatus::Expired,
    ];
    for status in terminal {
        assert!(status.is_terminal(), "{status} should be terminal");
    }

    let pending = [
        RunStatus::Queued,
        RunStatus::InProgress,
        RunStatus::RequiresAction,
        RunStatus::Cancelling,
    ];
    for status in pending {
        assert!(!status.is_terminal(), "{status} should not be terminal");
    }

    assert!(RunStatus::Completed.is_success());
    assert!(!RunStatus::Failed.is_success());
}

#[test]
fn it_displays_statuses_like_the_wire_format() -> Result<()> {
    assert_eq!(RunStatus::RequiresAction.to_string(), "requires_action");
    assert_eq!(
        serde_json::to_value(RunStatus::InProgress)?,
        json!("in_progress")
    );
    return Ok(());
}

#[test]
fn it_describes_failures() {
    let run = Run {
        id: "run_1".to_string(),
        thread_id: "thread_1".to_string(),
        assistant_id: "asst_1".to_string(),
        status: RunStatus::Failed,
        last_error: Some(RunError {
            code: "server_error".to_string(),
            message: "Something went wrong".to_string(),
        }),
    };

    insta::assert_snapshot!(run.describe_failure(), @"Run run_1 ended with status failed: server_error: Something went wrong");
}
