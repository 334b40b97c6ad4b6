//! Keyword-library types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::ConversationId;

/// An extracted-word document: one keyword and the conversations that
/// mention it, in mention order. Read-only from this system's side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub id: Uuid,
    pub word: String,
    pub owner: String,
    pub conversation_ids: Vec<ConversationId>,
}
