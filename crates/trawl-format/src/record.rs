//! Raw log record types.
//!
//! Every line of a session log is one JSON object with a top-level `type`
//! field. Only `user` and `assistant` records carry conversation content;
//! every other discriminator decodes to [`RecordBody::Other`] so that its
//! envelope (timestamp, cwd, ...) still participates in a scan.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A single decoded line from a session log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(flatten)]
    pub body: RecordBody,
}

/// The type-specific part of a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum RecordBody {
    #[serde(rename = "user")]
    User(UserBody),
    #[serde(rename = "assistant")]
    Assistant(AssistantBody),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserBody {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantBody {
    #[serde(default)]
    pub message: Option<Message>,
}

/// The `message` field shared by user and assistant records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Message content is either a bare string or an ordered list of blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(#[serde(deserialize_with = "lenient_blocks")] Vec<ContentBlock>),
    Other(Value),
}

/// A typed block inside a message's content list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "thinking")]
    Thinking {},
    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default = "empty_input")]
        input: Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default)]
        content: Option<ToolResultContent>,
    },
    #[default]
    #[serde(other)]
    Other,
}

fn empty_input() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Tool result content can be a string or an array of nested blocks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(#[serde(deserialize_with = "lenient_blocks")] Vec<ToolResultBlock>),
    Other(Value),
}

/// A nested block inside a tool result. Only text is kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResultBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<B> {
    Known(B),
    Unknown(IgnoredAny),
}

/// Decode a block list one element at a time. An element that does not fit
/// the block model (no `type`, wrong field types, not an object) becomes the
/// `Other` variant instead of failing the whole list.
fn lenient_blocks<'de, D, B>(deserializer: D) -> Result<Vec<B>, D::Error>
where
    D: Deserializer<'de>,
    B: Deserialize<'de> + Default,
{
    let items = Vec::<Lenient<B>>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|item| match item {
            Lenient::Known(block) => block,
            Lenient::Unknown(_) => {
                tracing::debug!("skipping undecodable content block");
                B::default()
            }
        })
        .collect())
}

/// Token counters reported on assistant records.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
}

/// A tool invocation as it appears in an assistant record.
#[derive(Debug, Clone, Copy)]
pub struct ToolUse<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

impl LogRecord {
    /// Decode one line. Blank or malformed lines yield `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        serde_json::from_str(trimmed).ok()
    }

    pub fn is_user(&self) -> bool {
        matches!(self.body, RecordBody::User(_))
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self.body, RecordBody::Assistant(_))
    }

    /// `"user"` or `"assistant"` for conversational records.
    pub fn role(&self) -> Option<&'static str> {
        match self.body {
            RecordBody::User(_) => Some("user"),
            RecordBody::Assistant(_) => Some("assistant"),
            RecordBody::Other => None,
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match &self.body {
            RecordBody::User(u) => u.message.as_ref(),
            RecordBody::Assistant(a) => a.message.as_ref(),
            RecordBody::Other => None,
        }
    }

    pub fn content(&self) -> Option<&MessageContent> {
        self.message().and_then(|m| m.content.as_ref())
    }

    pub fn usage(&self) -> Option<&Usage> {
        match &self.body {
            RecordBody::Assistant(a) => a.message.as_ref().and_then(|m| m.usage.as_ref()),
            _ => None,
        }
    }

    /// Non-empty envelope field, treating `""` like a missing value.
    pub fn cwd(&self) -> Option<&str> {
        non_empty(&self.cwd)
    }

    pub fn session_id(&self) -> Option<&str> {
        non_empty(&self.session_id)
    }

    pub fn version(&self) -> Option<&str> {
        non_empty(&self.version)
    }

    pub fn git_branch(&self) -> Option<&str> {
        non_empty(&self.git_branch)
    }

    pub fn timestamp(&self) -> Option<&str> {
        non_empty(&self.timestamp)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl MessageContent {
    /// All text blocks joined by newlines. Thinking blocks are skipped.
    pub fn joined_text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            MessageContent::Other(_) => String::new(),
        }
    }

    /// The bare string, or the first text block of a list.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(s) => Some(s),
            MessageContent::Blocks(blocks) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
            MessageContent::Other(_) => None,
        }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            MessageContent::Blocks(blocks) => blocks,
            _ => &[],
        }
    }

    /// Tool invocations in content order.
    pub fn tool_uses(&self) -> impl Iterator<Item = ToolUse<'_>> {
        self.blocks().iter().filter_map(|b| match b {
            ContentBlock::ToolUse { id, name, input } => Some(ToolUse { id, name, input }),
            _ => None,
        })
    }

    /// `(tool_use_id, flattened text)` for every tool result block.
    pub fn tool_results(&self) -> impl Iterator<Item = (&str, String)> {
        self.blocks().iter().filter_map(|b| match b {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
            } => Some((tool_use_id.as_str(), flatten_tool_result(content.as_ref()))),
            _ => None,
        })
    }

    /// Every searchable fragment of this content, in order: text blocks,
    /// string-valued tool inputs, and tool result texts (nested text
    /// blocks contribute one fragment each).
    pub fn searchable_parts(&self) -> Vec<&str> {
        let mut parts = Vec::new();
        match self {
            MessageContent::Text(s) => parts.push(s.as_str()),
            MessageContent::Blocks(blocks) => {
                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => parts.push(text.as_str()),
                        ContentBlock::ToolUse { input, .. } => {
                            if let Value::Object(map) = input {
                                parts.extend(map.values().filter_map(Value::as_str));
                            }
                        }
                        ContentBlock::ToolResult {
                            content: Some(content),
                            ..
                        } => match content {
                            ToolResultContent::Text(s) => parts.push(s.as_str()),
                            ToolResultContent::Blocks(nested) => {
                                parts.extend(nested.iter().filter_map(|b| match b {
                                    ToolResultBlock::Text { text } => Some(text.as_str()),
                                    ToolResultBlock::Other => None,
                                }))
                            }
                            ToolResultContent::Other(_) => {}
                        },
                        _ => {}
                    }
                }
            }
            MessageContent::Other(_) => {}
        }
        parts
    }
}

/// Flatten tool result content to text; nested text blocks join with `\n`.
pub fn flatten_tool_result(content: Option<&ToolResultContent>) -> String {
    match content {
        Some(ToolResultContent::Text(s)) => s.clone(),
        Some(ToolResultContent::Blocks(blocks)) => blocks
            .iter()
            .filter_map(|b| match b {
                ToolResultBlock::Text { text } => Some(text.as_str()),
                ToolResultBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(ToolResultContent::Other(_)) | None => String::new(),
    }
}

impl Usage {
    pub fn input(&self) -> u64 {
        self.input_tokens.unwrap_or(0)
    }

    pub fn output(&self) -> u64 {
        self.output_tokens.unwrap_or(0)
    }

    pub fn cache_read(&self) -> u64 {
        self.cache_read_input_tokens.unwrap_or(0)
    }

    pub fn cache_create(&self) -> u64 {
        self.cache_creation_input_tokens.unwrap_or(0)
    }
}
