use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message flag that shows a reply only to the invoking user.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
}

impl InteractionType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::ApplicationCommandAutocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }
}

/// Inbound interaction body. Fields the dispatcher never reads are ignored.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub application_id: String,
}

impl Interaction {
    pub fn interaction_type(&self) -> Option<InteractionType> {
        InteractionType::from_code(self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
}

impl CommandOption {
    pub fn integer(&self) -> Option<i64> {
        match self.value.as_ref()? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Snowflakes arrive as strings; numeric values are tolerated.
    pub fn snowflake(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::String(text) => Some(text.trim().to_owned()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseType {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: ResponseType::Pong as u8, data: None }
    }

    pub fn deferred() -> Self {
        Self { kind: ResponseType::DeferredChannelMessageWithSource as u8, data: None }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource as u8,
            data: Some(MessageData { content: content.into(), flags: None }),
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource as u8,
            data: Some(MessageData { content: content.into(), flags: Some(EPHEMERAL_FLAG) }),
        }
    }
}
