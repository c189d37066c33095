//! Log level definitions
//!
//! Levels are plain integers so that callers can define their own levels
//! between the four standard ones. The standard values leave gaps of four so
//! that `INFO+2` or `DEBUG-4` remain representable.

use super::error::HandlerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Level(i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    #[must_use]
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Four character label used in rendered output.
    ///
    /// Every level maps onto one of the four standard labels by range, so the
    /// mapping is monotonic in the level value.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self.category() {
            Level::DEBUG => "DBUG",
            Level::INFO => "INFO",
            Level::WARN => "WARN",
            _ => "ERRO",
        }
    }

    /// The standard level whose range contains this level.
    #[must_use]
    pub fn category(self) -> Level {
        if self < Level::INFO {
            Level::DEBUG
        } else if self < Level::WARN {
            Level::INFO
        } else if self < Level::ERROR {
            Level::WARN
        } else {
            Level::ERROR
        }
    }

    fn base_name(self) -> &'static str {
        match self.category() {
            Level::DEBUG => "DEBUG",
            Level::INFO => "INFO",
            Level::WARN => "WARN",
            _ => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.category();
        let offset = self.0 - base.0;
        if offset == 0 {
            write!(f, "{}", self.base_name())
        } else {
            write!(f, "{}{:+}", self.base_name(), offset)
        }
    }
}

impl FromStr for Level {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HandlerError::InvalidLevel(s.to_string());
        let trimmed = s.trim();
        let (name, offset) = match trimmed.find(['+', '-']) {
            Some(idx) => {
                let offset: i32 = trimmed[idx..].parse().map_err(|_| invalid())?;
                (&trimmed[..idx], offset)
            }
            None => (trimmed, 0),
        };

        let base = match name.to_uppercase().as_str() {
            "DEBUG" | "DBUG" => Level::DEBUG,
            "INFO" => Level::INFO,
            "WARN" | "WARNING" => Level::WARN,
            "ERROR" | "ERRO" => Level::ERROR,
            _ => return Err(invalid()),
        };

        base.0.checked_add(offset).map(Level).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Level {
    type Error = HandlerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}
