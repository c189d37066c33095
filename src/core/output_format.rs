//! Output format selection
//!
//! - Text: `key=value` lines for people reading a terminal (default)
//! - Json: one JSON object per line for machines

use super::error::HandlerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendering style of a handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    ///
    /// Example: `3:04PM INFO <server::accept:42> [api]: Request processed status=200`
    #[default]
    Text,

    /// JSON lines
    ///
    /// Example: `{"time":"3:04PM","level":"INFO","msg":"Request processed","status":200}`
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "console" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(HandlerError::config(
                "output_format",
                format!("unknown format '{}'", other),
            )),
        }
    }
}
