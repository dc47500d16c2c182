//! Validated token view.
//!
//! Signature and expiry checks happen before the policy core is invoked.
//! Conditions only look at the declared token type and the subject.

use serde::{Deserialize, Serialize};

/// Type marker of an OAuth 2.0 bearer access token.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Type marker of a dynamic client registration initial access token.
pub const TYPE_INITIAL_ACCESS_TOKEN: &str = "InitialAccessToken";

/// Type marker of a dynamic client registration access token.
pub const TYPE_REGISTRATION_ACCESS_TOKEN: &str = "RegistrationAccessToken";

/// A token presented with a client registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationToken {
    /// Declared token type (`typ` claim).
    #[serde(rename = "typ")]
    pub token_type: String,

    /// Subject (`sub` claim), usually a user ID.
    #[serde(default, rename = "sub", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Authorized party (`azp` claim).
    #[serde(default, rename = "azp", skip_serializing_if = "Option::is_none")]
    pub issued_for: Option<String>,

    /// Token identifier (`jti` claim).
    #[serde(default, rename = "jti", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RegistrationToken {
    /// Create a token with the given type marker.
    #[must_use]
    pub fn new(token_type: impl Into<String>) -> Self {
        Self {
            token_type: token_type.into(),
            subject: None,
            issued_for: None,
            id: None,
        }
    }

    /// Create a bearer access token.
    #[must_use]
    pub fn bearer() -> Self {
        Self::new(TOKEN_TYPE_BEARER)
    }

    /// Create an initial access token.
    #[must_use]
    pub fn initial_access() -> Self {
        Self::new(TYPE_INITIAL_ACCESS_TOKEN)
    }

    /// Create a registration access token.
    #[must_use]
    pub fn registration_access() -> Self {
        Self::new(TYPE_REGISTRATION_ACCESS_TOKEN)
    }

    /// Set the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the authorized party.
    #[must_use]
    pub fn with_issued_for(mut self, client_id: impl Into<String>) -> Self {
        self.issued_for = Some(client_id.into());
        self
    }

    /// Returns `true` for an initial access token.
    #[must_use]
    pub fn is_initial_access_token(&self) -> bool {
        self.token_type == TYPE_INITIAL_ACCESS_TOKEN
    }

    /// Returns `true` for a registration access token.
    #[must_use]
    pub fn is_registration_access_token(&self) -> bool {
        self.token_type == TYPE_REGISTRATION_ACCESS_TOKEN
    }

    /// Returns `true` for a bearer access token.
    #[must_use]
    pub fn is_bearer_token(&self) -> bool {
        self.token_type == TOKEN_TYPE_BEARER
    }
}
