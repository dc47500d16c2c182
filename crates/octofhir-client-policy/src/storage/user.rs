//! User storage trait.
//!
//! Defines the read-only user lookups client policy conditions rely on.
//! Implementations are provided by storage backends.

use serde::{Deserialize, Serialize};

use crate::ClientPolicyResult;

// =============================================================================
// User Type
// =============================================================================

/// A user of a realm.
///
/// Role assignments are not carried here; they are resolved through
/// [`RoleStorage::role_mappings`](crate::storage::RoleStorage::role_mappings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user (the token `sub`).
    pub id: String,

    /// Username for display/logging.
    pub username: String,

    /// Whether the user account is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl User {
    /// Creates a new enabled user.
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            enabled: true,
        }
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Read-only user lookups.
///
/// # Example
///
/// ```ignore
/// use octofhir_client_policy::storage::UserStorage;
///
/// fn example(storage: &impl UserStorage) -> ClientPolicyResult<()> {
///     if let Some(user) = storage.find_by_id("master", "b2f0...")? {
///         println!("Found user: {}", user.username);
///     }
///     Ok(())
/// }
/// ```
pub trait UserStorage: Send + Sync {
    /// Find a user of a realm by ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn find_by_id(&self, realm: &str, user_id: &str) -> ClientPolicyResult<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("u-1", "alice");
        assert_eq!(user.id, "u-1");
        assert_eq!(user.username, "alice");
        assert!(user.enabled);
    }

    #[test]
    fn test_user_deserialization_defaults_enabled() {
        let user: User = serde_json::from_str(r#"{"id": "u-1", "username": "alice"}"#).unwrap();
        assert!(user.enabled);
    }
}
