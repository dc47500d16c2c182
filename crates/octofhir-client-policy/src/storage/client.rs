//! Client storage trait.
//!
//! Defines the read-only client lookups used during policy evaluation.

use crate::ClientPolicyResult;
use crate::types::RealmClient;

// =============================================================================
// Client Storage Trait
// =============================================================================

/// Read-only client lookups.
///
/// # Example
///
/// ```ignore
/// use octofhir_client_policy::storage::ClientStorage;
///
/// fn example(storage: &impl ClientStorage) -> ClientPolicyResult<()> {
///     for client in storage.list_by_realm("master")? {
///         println!("Found client: {}", client.client_id);
///     }
///     Ok(())
/// }
/// ```
pub trait ClientStorage: Send + Sync {
    /// All clients registered in a realm.
    ///
    /// Order is implementation-defined; callers must not depend on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_by_realm(&self, realm: &str) -> ClientPolicyResult<Vec<RealmClient>>;

    /// Find a client of a realm by its OAuth `client_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn find_by_client_id(
        &self,
        realm: &str,
        client_id: &str,
    ) -> ClientPolicyResult<Option<RealmClient>>;
}
