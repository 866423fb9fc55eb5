#[cfg(test)]
#[path = "thread_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Status of a run as reported by the vendor. Values this client does not
/// know about land in `Unknown` and are treated as still in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        return matches!(
            self,
            RunStatus::Cancelled | RunStatus::Failed | RunStatus::Completed | RunStatus::Expired
        );
    }

    pub fn is_success(&self) -> bool {
        return *self == RunStatus::Completed;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub assistant_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    pub fn describe_failure(&self) -> String {
        let mut text = format!("Run {} ended with status {}", self.id, self.status);
        if let Some(err) = &self.last_error {
            text = format!("{text}: {}: {}", err.code, err.message);
        }

        return text;
    }
}
