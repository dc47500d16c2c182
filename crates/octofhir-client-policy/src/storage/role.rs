//! Role storage trait.
//!
//! Roles live in one of two namespaces: the realm itself, or a single
//! client of the realm. The same role name may exist in several namespaces;
//! a [`Role`] is therefore identified by its container as well as its name.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ClientPolicyResult;
use crate::types::RealmClient;

// =============================================================================
// Role Type
// =============================================================================

/// Namespace a role belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "clientId", rename_all = "camelCase")]
pub enum RoleContainer {
    /// A realm-level role.
    Realm,
    /// A role of the client with the given internal ID.
    Client(String),
}

impl fmt::Display for RoleContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Realm => write!(f, "realm"),
            Self::Client(id) => write!(f, "client:{}", id),
        }
    }
}

/// A role in a realm or client namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role name, unique within its container.
    pub name: String,

    /// Namespace the role belongs to.
    pub container: RoleContainer,
}

impl Role {
    /// Creates a realm-level role.
    #[must_use]
    pub fn realm(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: RoleContainer::Realm,
        }
    }

    /// Creates a role of the client with the given internal ID.
    #[must_use]
    pub fn client(client_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: RoleContainer::Client(client_id.into()),
        }
    }

    /// Returns `true` for realm-level roles.
    #[must_use]
    pub fn is_realm_role(&self) -> bool {
        matches!(self.container, RoleContainer::Realm)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.container {
            RoleContainer::Realm => write!(f, "{}", self.name),
            RoleContainer::Client(id) => write!(f, "{}/{}", id, self.name),
        }
    }
}

// =============================================================================
// Role Storage Trait
// =============================================================================

/// Read-only role lookups.
pub trait RoleStorage: Send + Sync {
    /// Find a realm-level role by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn realm_role(&self, realm: &str, name: &str) -> ClientPolicyResult<Option<Role>>;

    /// Find a role of a client by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn client_role(
        &self,
        realm: &str,
        client: &RealmClient,
        name: &str,
    ) -> ClientPolicyResult<Option<Role>>;

    /// All roles effectively held by a user, realm and client roles alike.
    ///
    /// Composite expansion and group inheritance are the implementation's
    /// concern; callers only test membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn role_mappings(&self, realm: &str, user_id: &str) -> ClientPolicyResult<HashSet<Role>>;
}
