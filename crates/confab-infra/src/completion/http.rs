//! HttpCompletionClient -- concrete [`CompletionClient`] implementation.
//!
//! POSTs the outbound history to the personality's endpoint and expects a
//! single assistant message back. Non-2xx statuses and transport errors
//! are hard failures for that send; there is no retry, and no timeout is
//! enforced beyond the transport default.
//!
//! The optional service key is wrapped in [`secrecy::SecretString`] and is
//! never logged or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use confab_core::completion::CompletionClient;
use confab_types::error::CompletionError;
use confab_types::message::Message;
use confab_types::personality::PersonalityKey;

/// Request body for the completion service.
#[derive(Serialize)]
struct CompletionBody<'a> {
    messages: &'a [Message],
}

/// HTTP client for the completion service.
///
/// One instance serves every personality; the endpoint path comes from
/// the static personality table.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpCompletionClient {
    /// Create a new client for the service rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attach a bearer key for deployments that front the completion
    /// service with authentication.
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Build the full URL for a personality's endpoint.
    fn url(&self, mode: PersonalityKey) -> String {
        format!("{}{}", self.base_url, mode.endpoint_path())
    }
}

impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        mode: PersonalityKey,
        history: &[Message],
    ) -> Result<Message, CompletionError> {
        let mut request = self
            .client
            .post(self.url(mode))
            .json(&CompletionBody { messages: history });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Service {
                status: status.as_u16(),
            });
        }

        response
            .json::<Message>()
            .await
            .map_err(|e| CompletionError::Deserialization(e.to_string()))
    }
}
