//! Request/response messages between the configuration UI and a page

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests a page host understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    StartElementSelection,
}

impl Request {
    /// Decode a raw message; `None` for unknown or malformed actions
    pub fn from_message(message: &Value) -> Option<Self> {
        serde_json::from_value(message.clone()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            error: None,
        }
    }

    pub fn unknown_action() -> Self {
        Self {
            success: false,
            error: Some("Unknown action".to_string()),
        }
    }
}
