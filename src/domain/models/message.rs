#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFileContent {
    pub file_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: ImageFileContent },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub run_id: Option<String>,
}

impl ThreadMessage {
    /// Joins every text part of the message. Image parts are rendered as a
    /// reference to the file holding them.
    pub fn text(&self) -> String {
        return self
            .content
            .iter()
            .filter_map(|content| {
                return match content {
                    MessageContent::Text { text } => Some(text.value.to_string()),
                    MessageContent::ImageFile { image_file } => {
                        Some(format!("[image: {}]", image_file.file_id))
                    }
                    MessageContent::Unsupported => None,
                };
            })
            .collect::<Vec<String>>()
            .join("\n");
    }
}

/// Request body used to append a message to a thread. `file_ids` is always
/// sent, even when empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub file_ids: Vec<String>,
}

impl NewMessage {
    pub fn user(content: &str, file_ids: &[String]) -> NewMessage {
        return NewMessage {
            role: Role::User,
            content: content.to_string(),
            file_ids: file_ids.to_vec(),
        };
    }
}
