#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;
use strum::EnumIter;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub file_ids: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl Assistant {
    pub fn display_name(&self) -> &str {
        return self.name.as_deref().unwrap_or("(unnamed)");
    }
}

/// Parameters used to create a new assistant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssistantTemplate {
    pub model: String,
    pub name: String,
    pub instructions: String,
    pub description: String,
    pub tools: Vec<Value>,
    pub file_ids: Vec<String>,
}

impl AssistantTemplate {
    /// Tool types are given as plain names, e.g. `code_interpreter,retrieval`.
    pub fn tools_from_list(list: &str) -> Vec<Value> {
        return list
            .split(',')
            .map(|tool| return tool.trim())
            .filter(|tool| return !tool.is_empty())
            .map(|tool| return serde_json::json!({ "type": tool }))
            .collect();
    }
}

/// Partial update of an assistant. Fields left as `None` are not sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
}

impl AssistantUpdate {
    /// Seeds an update with every editable field of `assistant`.
    pub fn from_assistant(assistant: &Assistant) -> AssistantUpdate {
        return AssistantUpdate {
            name: assistant.name.clone(),
            model: Some(assistant.model.to_string()),
            instructions: assistant.instructions.clone(),
            description: assistant.description.clone(),
            metadata: assistant.metadata.clone(),
            tools: Some(assistant.tools.clone()),
            file_ids: None,
        };
    }

    pub fn with_file_ids(file_ids: Vec<String>) -> AssistantUpdate {
        return AssistantUpdate {
            file_ids: Some(file_ids),
            ..Default::default()
        };
    }

    pub fn current_value(&self, field: AssistantField) -> String {
        let value = match field {
            AssistantField::Name => self.name.clone().map(Value::String),
            AssistantField::Model => self.model.clone().map(Value::String),
            AssistantField::Instructions => self.instructions.clone().map(Value::String),
            AssistantField::Description => self.description.clone().map(Value::String),
            AssistantField::Metadata => self.metadata.clone(),
            AssistantField::Tools => self.tools.clone().map(Value::Array),
        };

        return match value {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => "None".to_string(),
        };
    }

    /// Applies user input to a single field. Empty input keeps the current
    /// value. Structured fields must be valid JSON of the right shape, and are
    /// left untouched when they are not.
    pub fn apply(&mut self, field: AssistantField, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        match field {
            AssistantField::Name => self.name = Some(input.to_string()),
            AssistantField::Model => self.model = Some(input.to_string()),
            AssistantField::Instructions => self.instructions = Some(input.to_string()),
            AssistantField::Description => self.description = Some(input.to_string()),
            AssistantField::Metadata => {
                let parsed = parse_json(field, input)?;
                if !parsed.is_object() {
                    bail!("Invalid JSON for {field}, expected an object");
                }
                self.metadata = Some(parsed);
            }
            AssistantField::Tools => match parse_json(field, input)? {
                Value::Array(tools) => self.tools = Some(tools),
                _ => bail!("Invalid JSON for {field}, expected an array"),
            },
        }

        return Ok(());
    }
}

fn parse_json(field: AssistantField, input: &str) -> Result<Value> {
    return match serde_json::from_str::<Value>(input) {
        Ok(parsed) => Ok(parsed),
        Err(err) => bail!("Invalid JSON for {field}: {err}"),
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AssistantField {
    Name,
    Model,
    Instructions,
    Description,
    Metadata,
    Tools,
}
