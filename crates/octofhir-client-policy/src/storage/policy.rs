//! Client policy storage trait.
//!
//! Policies are authored through realm administration and loaded read-only
//! at evaluation time.

use crate::ClientPolicyResult;
use crate::policy::model::ClientPolicyRepresentation;

// =============================================================================
// Client Policy Storage Trait
// =============================================================================

/// Read-only access to the client policies of a realm.
///
/// # Example
///
/// ```ignore
/// use octofhir_client_policy::storage::ClientPolicyStorage;
///
/// fn example(storage: &impl ClientPolicyStorage) -> ClientPolicyResult<()> {
///     for policy in storage.find_by_realm("master")? {
///         println!("Policy: {} (enabled: {})", policy.name, policy.enabled);
///     }
///     Ok(())
/// }
/// ```
pub trait ClientPolicyStorage: Send + Sync {
    /// All policies of a realm, enabled or not, in authoring order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn find_by_realm(&self, realm: &str) -> ClientPolicyResult<Vec<ClientPolicyRepresentation>>;
}
