//! Client domain types.
//!
//! [`RealmClient`] is the stored client as the policy core sees it;
//! [`ClientRepresentation`] is the metadata submitted by the caller of a
//! registration or update.

use serde::{Deserialize, Serialize};

// =============================================================================
// Realm Client
// =============================================================================

/// A client registered in a realm.
///
/// Client roles are looked up through
/// [`RoleStorage::client_role`](crate::storage::RoleStorage::client_role),
/// so only the identity of the client is carried here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmClient {
    /// Internal identifier.
    pub id: String,

    /// Public OAuth `client_id`.
    pub client_id: String,

    /// Human-readable display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether this is a public client.
    #[serde(default)]
    pub public_client: bool,
}

impl RealmClient {
    /// Create a confidential client whose internal ID equals its client ID.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        let client_id = client_id.into();
        Self {
            id: client_id.clone(),
            client_id,
            name: None,
            public_client: false,
        }
    }

    /// Set the internal identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the client as public.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.public_client = true;
        self
    }
}

// =============================================================================
// Client Representation
// =============================================================================

/// Client metadata submitted for registration or update.
///
/// Only the fields client policies inspect are modelled; unknown fields are
/// ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    /// Requested `client_id` (may be assigned by the server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Requested display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Requested redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Whether the client is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,

    /// Names of client scopes bound as default scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_client_scopes: Option<Vec<String>>,

    /// Names of client scopes bound as optional scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_client_scopes: Option<Vec<String>>,
}

impl ClientRepresentation {
    /// Create a representation for the given client ID.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Default::default()
        }
    }

    /// Scope names requested for the given binding type, if any were sent.
    #[must_use]
    pub fn client_scopes(&self, default_scope: bool) -> Option<&[String]> {
        if default_scope {
            self.default_client_scopes.as_deref()
        } else {
            self.optional_client_scopes.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_client_builder() {
        let client = RealmClient::new("portal")
            .with_id("8d1f")
            .with_name("Patient Portal")
            .public();

        assert_eq!(client.id, "8d1f");
        assert_eq!(client.client_id, "portal");
        assert_eq!(client.name.as_deref(), Some("Patient Portal"));
        assert!(client.public_client);
    }

    #[test]
    fn test_representation_deserialization_ignores_unknown_fields() {
        let rep: ClientRepresentation = serde_json::from_value(serde_json::json!({
            "clientId": "dcr-app",
            "redirectUris": ["https://app.example.org/cb"],
            "defaultClientScopes": ["profile", "email"],
            "protocol": "openid-connect"
        }))
        .unwrap();

        assert_eq!(rep.client_id.as_deref(), Some("dcr-app"));
        assert_eq!(rep.redirect_uris.len(), 1);
        assert_eq!(
            rep.client_scopes(true),
            Some(&["profile".to_string(), "email".to_string()][..])
        );
        assert!(rep.client_scopes(false).is_none());
    }
}
