//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `confab-core` using sqlx with
//! split read/write pools. A conversation is stored as a document: the
//! message array lives in a JSON text column and every update overwrites
//! it wholesale (last-writer-wins per id).

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use confab_core::conversation::repository::ConversationRepository;
use confab_types::conversation::{Conversation, ConversationId, NewConversation};
use confab_types::error::RepositoryError;
use confab_types::message::Message;
use confab_types::personality::PersonalityKey;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain Conversation.
struct ConversationRow {
    id: String,
    owner: String,
    mode: String,
    title: String,
    messages: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner: row.try_get("owner")?,
            mode: row.try_get("mode")?,
            title: row.try_get("title")?,
            messages: row.try_get("messages")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let mode: PersonalityKey = self
            .mode
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let messages: Vec<Message> = serde_json::from_str(&self.messages)
            .map_err(|e| RepositoryError::Query(format!("invalid messages document: {e}")))?;

        Ok(Conversation {
            id: ConversationId::from_uuid(id),
            title: self.title,
            mode,
            owner: self.owner,
            messages,
        })
    }
}

fn messages_json(messages: &[Message]) -> Result<String, RepositoryError> {
    serde_json::to_string(messages)
        .map_err(|e| RepositoryError::Query(format!("serialize messages: {e}")))
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create(&self, draft: &NewConversation) -> Result<Conversation, RepositoryError> {
        let conversation = Conversation {
            id: ConversationId::new(),
            title: draft.title.clone(),
            mode: draft.mode,
            owner: draft.owner.clone(),
            messages: draft.messages.clone(),
        };

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO conversations (id, owner, mode, title, messages, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.owner)
        .bind(conversation.mode.to_string())
        .bind(&conversation.title)
        .bind(messages_json(&conversation.messages)?)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(conversation)
    }

    async fn update_messages(
        &self,
        id: &ConversationId,
        messages: &[Message],
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE conversations SET messages = ?, updated_at = ? WHERE id = ?",
        )
        .bind(messages_json(messages)?)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Conversation>, RepositoryError> {
        // Creation order keeps roster positions stable as entries append.
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE owner = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation_row =
                ConversationRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            conversations.push(conversation_row.into_conversation()?);
        }

        Ok(conversations)
    }

    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }
}
