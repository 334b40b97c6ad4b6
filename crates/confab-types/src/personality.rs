//! The closed personality table.
//!
//! Each personality maps to a fixed opening greeting and a fixed
//! completion-service endpoint. The table is static configuration; there
//! is no runtime string dispatch and no user extension point.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::message::Message;

/// Identifier of an assistant personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalityKey {
    Intellectual,
    Funny,
}

impl PersonalityKey {
    /// Every personality, in selection-screen order.
    pub const ALL: [PersonalityKey; 2] = [PersonalityKey::Intellectual, PersonalityKey::Funny];

    /// The fixed assistant greeting shown the instant this personality is
    /// chosen. Local UI framing only -- it is never sent back to the
    /// completion service.
    pub fn greeting(self) -> &'static str {
        match self {
            PersonalityKey::Intellectual => {
                "안녕? 나는 안경척!이야. 오늘은 어떤 지적인 이야기를 나눌까?"
            }
            PersonalityKey::Funny => "안녕? 나는 덕메야. 오늘은 무슨 재미난 일이 있었니?",
        }
    }

    /// Path of the completion endpoint serving this personality.
    pub fn endpoint_path(self) -> &'static str {
        match self {
            PersonalityKey::Intellectual => "/api/intellectual",
            PersonalityKey::Funny => "/api/funny",
        }
    }

    /// The greeting as a ready-to-append assistant message.
    pub fn opening_message(self) -> Message {
        Message::assistant(self.greeting())
    }
}

impl fmt::Display for PersonalityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonalityKey::Intellectual => write!(f, "intellectual"),
            PersonalityKey::Funny => write!(f, "funny"),
        }
    }
}

impl FromStr for PersonalityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intellectual" => Ok(PersonalityKey::Intellectual),
            "funny" => Ok(PersonalityKey::Funny),
            other => Err(format!("invalid personality key: '{other}'")),
        }
    }
}
