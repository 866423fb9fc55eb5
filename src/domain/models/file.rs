use chrono::NaiveDateTime;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
    pub purpose: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub created_at: i64,
}

impl FileObject {
    pub fn created_at_display(&self) -> String {
        return match NaiveDateTime::from_timestamp_opt(self.created_at, 0) {
            Some(timestamp) => timestamp.format("%Y-%m-%d %H:%M").to_string(),
            None => "unknown".to_string(),
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display)]
pub enum FilePurpose {
    #[strum(serialize = "fine-tune")]
    FineTune,
    #[strum(serialize = "assistants")]
    Assistants,
    #[strum(serialize = "fine-tune-results")]
    FineTuneResults,
    #[strum(serialize = "assistants_output")]
    AssistantsOutput,
}

impl FilePurpose {
    pub fn label(&self) -> &'static str {
        return match self {
            FilePurpose::FineTune => "Fine-tune",
            FilePurpose::Assistants => "Assistants",
            FilePurpose::FineTuneResults => "Fine-tune results",
            FilePurpose::AssistantsOutput => "Assistants output",
        };
    }

    /// Maps a 1-based menu choice to a purpose.
    pub fn from_choice(choice: usize) -> Option<FilePurpose> {
        if choice == 0 {
            return None;
        }
        return FilePurpose::iter().nth(choice - 1);
    }
}
