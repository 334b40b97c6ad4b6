//! Keyword library lookup.
//!
//! A read-only adjacency to the session manager: each extracted-word
//! document lists the conversations that mention it, and the UI deep-links
//! those back into the main session view. No write path, no state machine.

use tracing::warn;

use confab_types::error::RepositoryError;
use confab_types::library::KeywordEntry;

/// Repository trait for the extracted-word index.
///
/// Implementations live in confab-infra (e.g., `SqliteKeywordRepository`).
pub trait KeywordRepository: Send + Sync {
    /// List a user's extracted words. Zero matches is an empty list, not
    /// an error.
    fn list_by_owner(
        &self,
        owner: &str,
    ) -> impl std::future::Future<Output = Result<Vec<KeywordEntry>, RepositoryError>> + Send;
}

/// Read-only facade over the keyword index.
pub struct LibraryService<K> {
    repo: K,
}

impl<K: KeywordRepository> LibraryService<K> {
    pub fn new(repo: K) -> Self {
        Self { repo }
    }

    /// Fetch the extracted words for a user.
    ///
    /// A query failure degrades to an empty list; the library page renders
    /// empty rather than blocking.
    pub async fn list_words(&self, owner: &str) -> Vec<KeywordEntry> {
        match self.repo.list_by_owner(owner).await {
            Ok(words) => words,
            Err(err) => {
                warn!(owner, error = %err, "keyword query failed, returning empty library");
                Vec::new()
            }
        }
    }
}
