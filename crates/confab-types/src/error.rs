use thiserror::Error;

/// Errors from repository operations (used by trait definitions in
/// confab-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the completion service.
///
/// Any of these is a hard failure for the triggering send: the service is
/// called once per cycle with no retry and no partial result.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service returned status {status}")]
    Service { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed completion response: {0}")]
    Deserialization(String),
}

/// Errors from session-manager operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a send is already in flight")]
    SendInFlight,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no conversation is active")]
    NoActiveConversation,

    #[error("roster index {0} out of range")]
    InvalidRosterIndex(usize),

    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("store failure: {0}")]
    Store(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_completion_error_display() {
        let err = CompletionError::Service { status: 502 };
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_session_error_from_completion() {
        let err: SessionError = CompletionError::Transport("refused".to_string()).into();
        assert!(matches!(err, SessionError::Completion(_)));
    }
}
