//! ConversationRepository trait definition.
//!
//! The store is a document store keyed by conversation id: create assigns
//! the id, update overwrites the full message array, query filters by
//! owner.

use confab_types::conversation::{Conversation, ConversationId, NewConversation};
use confab_types::error::RepositoryError;
use confab_types::message::Message;

/// Repository trait for conversation document persistence.
///
/// Implementations live in confab-infra (e.g., `SqliteConversationRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConversationRepository: Send + Sync {
    /// Persist an unsaved draft, assigning its id.
    ///
    /// Called exactly once per conversation; every later write goes
    /// through [`update_messages`](Self::update_messages).
    fn create(
        &self,
        draft: &NewConversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Overwrite the full message array of an existing conversation.
    ///
    /// Overwrite semantics, not append: the client session is the single
    /// source of truth for the active conversation, and the store is
    /// last-writer-wins per id.
    fn update_messages(
        &self,
        id: &ConversationId,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List conversations owned by a user, in creation order.
    ///
    /// An owner with no conversations yields an empty list, not an error.
    fn list_by_owner(
        &self,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Fetch a single conversation by id (library deep links).
    fn get(
        &self,
        id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;
}
