//! Request/response contract between the host surfaces and the engine.
//!
//! Wire-compatible with the extension message shapes: requests are tagged
//! by a SCREAMING_SNAKE `type` field, responses are bare payloads. Errors
//! never cross this boundary as anything but `{success: false, error}`.

use serde::{Deserialize, Serialize};

use crate::engine::{DiscoveredElement, Discovery, RestoreSummary, RevealSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "PING")]
    Ping,
    #[serde(rename = "DISCOVER_ELEMENTS")]
    DiscoverElements,
    #[serde(rename = "REVEAL_ELEMENT", rename_all = "camelCase")]
    RevealElement { element_id: String },
    #[serde(rename = "RESTORE_ELEMENT", rename_all = "camelCase")]
    RestoreElement { element_id: String },
    #[serde(rename = "REVEAL_ALL")]
    RevealAll,
    #[serde(rename = "RESTORE_ALL")]
    RestoreAll,
    #[serde(rename = "HIGHLIGHT_ELEMENT", rename_all = "camelCase")]
    HighlightElement { element_id: String },
    #[serde(rename = "UNHIGHLIGHT_ALL")]
    UnhighlightAll,
}

/// Liveness probe answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
}

impl Status {
    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<DiscoveredElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Plain success/error acknowledgement (highlight operations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Status(Status),
    Discovery(Discovery),
    Reveal(RevealResponse),
    Restore(RestoreResponse),
    RevealSummary(RevealSummary),
    RestoreSummary(RestoreSummary),
    Ack(AckResponse),
}
