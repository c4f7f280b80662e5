//! Wire types for the Workers AI chat-completion run endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Clone, Debug)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub const fn system(content: String) -> Self {
        Self {
            role: Role::System,
            content,
        }
    }

    pub const fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }
}

/// Structured-output constraint, JSON-schema flavored
#[derive(Serialize, Clone, Debug)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: Value,
}

impl ResponseFormat {
    pub const fn json_schema(schema: Value) -> Self {
        Self {
            kind: "json_schema",
            json_schema: schema,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct RunRequest {
    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl RunRequest {
    pub const fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            response_format: None,
        }
    }
}

/// Workers AI response envelope; `result.response` carries the payload
#[derive(Deserialize, Debug)]
pub struct RunEnvelope {
    #[serde(default)]
    pub result: Option<RunResult>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[derive(Deserialize, Debug)]
pub struct RunResult {
    #[serde(default)]
    pub response: Value,
}

#[derive(Deserialize, Debug)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}
