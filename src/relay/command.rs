//! Scene command wire format
//!
//! Commands travel as a JSON object wrapped in literal delimiters so they can
//! be embedded in free text: `|UNITY_CMD|{"action":"create",...}|END_CMD|`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const COMMAND_START: &str = "|UNITY_CMD|";
pub const COMMAND_END: &str = "|END_CMD|";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing command delimiters")]
    MissingDelimiters,
    #[error("Invalid command body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Command understood by the scene client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum SceneCommand {
    #[serde(rename = "create")]
    CreateObject { object: String, color: String },
    #[serde(rename = "color")]
    SetColor { value: String },
}

impl SceneCommand {
    /// Encode as a delimited wire payload
    pub fn to_wire(&self) -> String {
        // Serializing a plain enum of strings cannot fail
        let body = serde_json::to_string(self).unwrap_or_default();
        format!("{COMMAND_START}{body}{COMMAND_END}")
    }

    /// Decode the first delimited command found in `text`
    pub fn from_wire(text: &str) -> Result<Self, RelayError> {
        let (_, rest) = text
            .split_once(COMMAND_START)
            .ok_or(RelayError::MissingDelimiters)?;
        let (body, _) = rest
            .split_once(COMMAND_END)
            .ok_or(RelayError::MissingDelimiters)?;
        Ok(serde_json::from_str(body.trim())?)
    }
}
