//! SQLite keyword-index repository implementation.
//!
//! Read-only from this system's side: the extraction pipeline that writes
//! these rows lives elsewhere. `conversation_ids` is a JSON array column,
//! kept in mention order.

use sqlx::Row;
use uuid::Uuid;

use confab_core::library::KeywordRepository;
use confab_types::conversation::ConversationId;
use confab_types::error::RepositoryError;
use confab_types::library::KeywordEntry;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KeywordRepository`.
pub struct SqliteKeywordRepository {
    pool: DatabasePool,
}

impl SqliteKeywordRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain KeywordEntry.
struct KeywordRow {
    id: String,
    owner: String,
    word: String,
    conversation_ids: String,
}

impl KeywordRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner: row.try_get("owner")?,
            word: row.try_get("word")?,
            conversation_ids: row.try_get("conversation_ids")?,
        })
    }

    fn into_entry(self) -> Result<KeywordEntry, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid keyword id: {e}")))?;
        let raw_ids: Vec<String> = serde_json::from_str(&self.conversation_ids)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_ids: {e}")))?;

        let mut conversation_ids = Vec::with_capacity(raw_ids.len());
        for raw in &raw_ids {
            let parsed = raw
                .parse::<ConversationId>()
                .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
            conversation_ids.push(parsed);
        }

        Ok(KeywordEntry {
            id,
            word: self.word,
            owner: self.owner,
            conversation_ids,
        })
    }
}

impl KeywordRepository for SqliteKeywordRepository {
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<KeywordEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM extracted_words WHERE owner = ? ORDER BY word ASC")
            .bind(owner)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let keyword_row =
                KeywordRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            entries.push(keyword_row.into_entry()?);
        }

        Ok(entries)
    }
}
