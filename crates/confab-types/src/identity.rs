//! Identity-provider session types.
//!
//! The identity provider itself is external (login, OAuth, profile
//! pages); this module only models what it resolves to.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Resolution state of the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Loading => write!(f, "loading"),
            AuthStatus::Authenticated => write!(f, "authenticated"),
            AuthStatus::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

/// A snapshot of the identity provider's session.
///
/// `username` is present exactly when `status` is `Authenticated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub status: AuthStatus,
    pub username: Option<String>,
    pub display_image_url: Option<String>,
}

impl AuthSession {
    /// Identity resolution still in progress.
    pub fn loading() -> Self {
        Self {
            status: AuthStatus::Loading,
            username: None,
            display_image_url: None,
        }
    }

    /// No identity; the UI redirects to the login surface.
    pub fn unauthenticated() -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            username: None,
            display_image_url: None,
        }
    }

    /// A fully resolved identity.
    pub fn authenticated(username: impl Into<String>, display_image_url: Option<String>) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            username: Some(username.into()),
            display_image_url,
        }
    }
}
