//! Completion-service client port.

use confab_types::error::CompletionError;
use confab_types::message::Message;
use confab_types::personality::PersonalityKey;

/// Client for the turn-based completion service.
///
/// The protocol is strict request/response: the visible history minus the
/// fixed greeting goes out, exactly one new assistant message comes back.
/// No streaming, no retry, no partial results.
///
/// Implementations live in confab-infra (e.g., `HttpCompletionClient`).
pub trait CompletionClient: Send + Sync {
    /// Request the next assistant message for the given history.
    fn complete(
        &self,
        mode: PersonalityKey,
        history: &[Message],
    ) -> impl std::future::Future<Output = Result<Message, CompletionError>> + Send;
}
