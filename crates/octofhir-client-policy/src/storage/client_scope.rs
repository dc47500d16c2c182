//! Client scope storage trait.
//!
//! A client scope is bound to a client either as a default scope (always
//! granted) or as an optional scope (granted on request). The binding is
//! keyed by the pair (scope, client).

use serde::{Deserialize, Serialize};

use crate::ClientPolicyResult;

// =============================================================================
// Client Scope
// =============================================================================

/// A client scope defined in a realm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScope {
    /// Internal identifier.
    pub id: String,

    /// Scope name as requested in the `scope` parameter.
    pub name: String,
}

impl ClientScope {
    /// Create a scope whose ID equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
        }
    }
}

// =============================================================================
// Client Scope Mapping
// =============================================================================

/// Identity of a scope binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeMappingKey {
    /// Bound client scope ID.
    pub client_scope_id: String,

    /// Internal ID of the client.
    pub client_id: String,
}

/// A client scope bound to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeMapping {
    /// Binding identity.
    #[serde(flatten)]
    pub key: ClientScopeMappingKey,

    /// `true` for a default scope, `false` for an optional scope.
    #[serde(default)]
    pub default_scope: bool,
}

impl ClientScopeMapping {
    /// Create a binding.
    #[must_use]
    pub fn new(
        client_scope_id: impl Into<String>,
        client_id: impl Into<String>,
        default_scope: bool,
    ) -> Self {
        Self {
            key: ClientScopeMappingKey {
                client_scope_id: client_scope_id.into(),
                client_id: client_id.into(),
            },
            default_scope,
        }
    }
}

// =============================================================================
// Client Scope Storage Trait
// =============================================================================

/// Read-only client scope lookups.
pub trait ClientScopeStorage: Send + Sync {
    /// All client scopes defined in a realm.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_scopes(&self, realm: &str) -> ClientPolicyResult<Vec<ClientScope>>;

    /// IDs of the scopes bound to a client with the given binding type.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn scope_ids_by_client(
        &self,
        realm: &str,
        client_id: &str,
        default_scope: bool,
    ) -> ClientPolicyResult<Vec<String>>;
}
