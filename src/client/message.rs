//! Wire messages of the update channel

use crate::error::Result;
use crate::hmr::Update;
use serde::{Deserialize, Serialize};

/// Server → client message, tagged by its `type` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Connected,
    Update { updates: Vec<Update> },
}

/// Decode one text frame
pub fn decode_message(text: &str) -> Result<ServerMessage> {
    Ok(serde_json::from_str(text)?)
}
