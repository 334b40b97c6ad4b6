//! Conversation document types.
//!
//! A conversation is a store document: title, mode, owner, and the full
//! ordered message list. The id is store-assigned at the first persist; a
//! draft without an id exists only in memory.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::message::Message;
use crate::personality::PersonalityKey;

/// Unique identifier for a persisted conversation, wrapping a UUID v7
/// (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Create a new ConversationId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a ConversationId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A persisted conversation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    /// Human-readable creation timestamp.
    pub title: String,
    pub mode: PersonalityKey,
    /// Username of the owning user.
    pub owner: String,
    pub messages: Vec<Message>,
}

/// An unsaved conversation draft.
///
/// Exists only in memory between personality selection and the first
/// store write, which assigns the id.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub title: String,
    pub mode: PersonalityKey,
    pub owner: String,
    pub messages: Vec<Message>,
}
