//! In-memory storage backend.
//!
//! [`InMemoryRealmStore`] implements every storage trait of this crate on
//! top of plain maps. It is populated programmatically or from a
//! [`RealmSnapshot`] (JSON), which makes it suitable for tests, tooling and
//! embedding a fixed realm configuration.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::ClientPolicyResult;
use crate::error::ClientPolicyError;
use crate::policy::model::ClientPolicyRepresentation;
use crate::storage::{
    ClientPolicyStorage, ClientScope, ClientScopeMapping, ClientScopeMappingKey,
    ClientScopeStorage, ClientStorage, Role, RoleStorage, User, UserStorage,
};
use crate::types::RealmClient;

// =============================================================================
// Realm Snapshot
// =============================================================================

/// Serializable description of one realm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmSnapshot {
    /// Realm name.
    pub realm: String,

    /// Users of the realm.
    #[serde(default)]
    pub users: Vec<User>,

    /// Names of realm-level roles.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Registered clients with their role names.
    #[serde(default)]
    pub clients: Vec<ClientSnapshot>,

    /// Role assignments per user.
    #[serde(default)]
    pub role_mappings: Vec<RoleMappingSnapshot>,

    /// Client scopes of the realm.
    #[serde(default)]
    pub client_scopes: Vec<ClientScope>,

    /// Client scope bindings.
    #[serde(default)]
    pub scope_mappings: Vec<ClientScopeMapping>,

    /// Client policies in authoring order.
    #[serde(default)]
    pub policies: Vec<ClientPolicyRepresentation>,
}

/// A client and the names of its roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSnapshot {
    /// The client.
    #[serde(flatten)]
    pub client: RealmClient,

    /// Names of roles defined by the client.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Role assignments of one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMappingSnapshot {
    /// User ID.
    pub user_id: String,

    /// Assigned realm role names.
    #[serde(default)]
    pub realm_roles: Vec<String>,

    /// Assigned client role names keyed by client internal ID.
    #[serde(default)]
    pub client_roles: BTreeMap<String, Vec<String>>,
}

impl RealmSnapshot {
    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the document is not a valid snapshot.
    pub fn from_json_str(content: &str) -> ClientPolicyResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ClientPolicyError::storage(format!("invalid realm snapshot: {}", e)))
    }

    /// Read a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> ClientPolicyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientPolicyError::storage(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

#[derive(Debug, Default)]
struct RealmData {
    users: HashMap<String, User>,
    realm_roles: HashSet<String>,
    clients: Vec<RealmClient>,
    client_roles: HashMap<String, HashSet<String>>,
    role_mappings: HashMap<String, HashSet<Role>>,
    scopes: Vec<ClientScope>,
    scope_mappings: HashMap<ClientScopeMappingKey, bool>,
    policies: Vec<ClientPolicyRepresentation>,
}

/// Realm data held in memory, keyed by realm name.
///
/// Lookups in an unknown realm behave like lookups in an empty realm.
#[derive(Debug, Default)]
pub struct InMemoryRealmStore {
    realms: DashMap<String, RealmData>,
}

impl InMemoryRealmStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one realm snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: RealmSnapshot) -> Self {
        let store = Self::new();
        store.load_snapshot(snapshot);
        store
    }

    /// Add (or extend) a realm from a snapshot.
    pub fn load_snapshot(&self, snapshot: RealmSnapshot) {
        let realm = snapshot.realm;

        for user in snapshot.users {
            self.add_user(&realm, user);
        }
        for role in snapshot.roles {
            self.add_realm_role(&realm, role);
        }
        for entry in snapshot.clients {
            let client_id = entry.client.id.clone();
            self.add_client(&realm, entry.client);
            for role in entry.roles {
                self.add_client_role(&realm, &client_id, role);
            }
        }
        for mapping in snapshot.role_mappings {
            for role in mapping.realm_roles {
                self.grant_role(&realm, &mapping.user_id, Role::realm(role));
            }
            for (client_id, roles) in mapping.client_roles {
                for role in roles {
                    self.grant_role(&realm, &mapping.user_id, Role::client(&client_id, role));
                }
            }
        }
        for scope in snapshot.client_scopes {
            self.add_client_scope(&realm, scope);
        }
        for mapping in snapshot.scope_mappings {
            self.bind_client_scope(&realm, mapping);
        }
        for policy in snapshot.policies {
            self.add_policy(&realm, policy);
        }
    }

    /// Add or replace a user.
    pub fn add_user(&self, realm: &str, user: User) {
        self.update_realm(realm, |data| {
            data.users.insert(user.id.clone(), user);
        });
    }

    /// Define a realm-level role.
    pub fn add_realm_role(&self, realm: &str, name: impl Into<String>) {
        self.update_realm(realm, |data| {
            data.realm_roles.insert(name.into());
        });
    }

    /// Register a client. A client with the same internal ID is replaced.
    pub fn add_client(&self, realm: &str, client: RealmClient) {
        self.update_realm(realm, |data| {
            data.clients.retain(|c| c.id != client.id);
            data.clients.push(client);
        });
    }

    /// Define a role in a client's namespace.
    pub fn add_client_role(&self, realm: &str, client_id: &str, name: impl Into<String>) {
        self.update_realm(realm, |data| {
            data.client_roles
                .entry(client_id.to_string())
                .or_default()
                .insert(name.into());
        });
    }

    /// Assign a role to a user.
    pub fn grant_role(&self, realm: &str, user_id: &str, role: Role) {
        self.update_realm(realm, |data| {
            data.role_mappings
                .entry(user_id.to_string())
                .or_default()
                .insert(role);
        });
    }

    /// Define a client scope.
    pub fn add_client_scope(&self, realm: &str, scope: ClientScope) {
        self.update_realm(realm, |data| {
            data.scopes.retain(|s| s.id != scope.id);
            data.scopes.push(scope);
        });
    }

    /// Bind a client scope to a client.
    pub fn bind_client_scope(&self, realm: &str, mapping: ClientScopeMapping) {
        self.update_realm(realm, |data| {
            data.scope_mappings.insert(mapping.key, mapping.default_scope);
        });
    }

    /// Append a client policy.
    pub fn add_policy(&self, realm: &str, policy: ClientPolicyRepresentation) {
        self.update_realm(realm, |data| data.policies.push(policy));
    }

    /// Names of all realms held by the store.
    #[must_use]
    pub fn realm_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.realms.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn update_realm(&self, realm: &str, f: impl FnOnce(&mut RealmData)) {
        let mut data = self.realms.entry(realm.to_string()).or_default();
        f(&mut data);
    }

    fn with_realm<T>(&self, realm: &str, default: T, f: impl FnOnce(&RealmData) -> T) -> T {
        self.realms.get(realm).map_or(default, |data| f(&data))
    }
}

impl UserStorage for InMemoryRealmStore {
    fn find_by_id(&self, realm: &str, user_id: &str) -> ClientPolicyResult<Option<User>> {
        Ok(self.with_realm(realm, None, |data| data.users.get(user_id).cloned()))
    }
}

impl RoleStorage for InMemoryRealmStore {
    fn realm_role(&self, realm: &str, name: &str) -> ClientPolicyResult<Option<Role>> {
        Ok(self.with_realm(realm, None, |data| {
            data.realm_roles.contains(name).then(|| Role::realm(name))
        }))
    }

    fn client_role(
        &self,
        realm: &str,
        client: &RealmClient,
        name: &str,
    ) -> ClientPolicyResult<Option<Role>> {
        Ok(self.with_realm(realm, None, |data| {
            data.client_roles
                .get(&client.id)
                .is_some_and(|roles| roles.contains(name))
                .then(|| Role::client(&client.id, name))
        }))
    }

    fn role_mappings(&self, realm: &str, user_id: &str) -> ClientPolicyResult<HashSet<Role>> {
        Ok(self.with_realm(realm, HashSet::new(), |data| {
            data.role_mappings.get(user_id).cloned().unwrap_or_default()
        }))
    }
}

impl ClientStorage for InMemoryRealmStore {
    fn list_by_realm(&self, realm: &str) -> ClientPolicyResult<Vec<RealmClient>> {
        Ok(self.with_realm(realm, Vec::new(), |data| data.clients.clone()))
    }

    fn find_by_client_id(
        &self,
        realm: &str,
        client_id: &str,
    ) -> ClientPolicyResult<Option<RealmClient>> {
        Ok(self.with_realm(realm, None, |data| {
            data.clients
                .iter()
                .find(|c| c.client_id == client_id)
                .cloned()
        }))
    }
}

impl ClientScopeStorage for InMemoryRealmStore {
    fn list_scopes(&self, realm: &str) -> ClientPolicyResult<Vec<ClientScope>> {
        Ok(self.with_realm(realm, Vec::new(), |data| data.scopes.clone()))
    }

    fn scope_ids_by_client(
        &self,
        realm: &str,
        client_id: &str,
        default_scope: bool,
    ) -> ClientPolicyResult<Vec<String>> {
        Ok(self.with_realm(realm, Vec::new(), |data| {
            let mut ids: Vec<String> = data
                .scope_mappings
                .iter()
                .filter(|(key, is_default)| key.client_id == client_id && **is_default == default_scope)
                .map(|(key, _)| key.client_scope_id.clone())
                .collect();
            ids.sort();
            ids
        }))
    }
}

impl ClientPolicyStorage for InMemoryRealmStore {
    fn find_by_realm(&self, realm: &str) -> ClientPolicyResult<Vec<ClientPolicyRepresentation>> {
        Ok(self.with_realm(realm, Vec::new(), |data| data.policies.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_json() -> serde_json::Value {
        serde_json::json!({
            "realm": "acme",
            "users": [
                { "id": "u-1", "username": "alice" },
                { "id": "u-2", "username": "bob", "enabled": false }
            ],
            "roles": ["admin", "auditor"],
            "clients": [
                { "id": "c-1", "clientId": "portal", "roles": ["viewer", "admin"] },
                { "id": "c-2", "clientId": "billing", "publicClient": true }
            ],
            "roleMappings": [
                { "userId": "u-1", "realmRoles": ["auditor"], "clientRoles": { "c-1": ["viewer"] } }
            ],
            "clientScopes": [
                { "id": "s-1", "name": "email" },
                { "id": "s-2", "name": "offline_access" }
            ],
            "scopeMappings": [
                { "clientScopeId": "s-1", "clientId": "c-1", "defaultScope": true },
                { "clientScopeId": "s-2", "clientId": "c-1", "defaultScope": false }
            ]
        })
    }

    fn store() -> InMemoryRealmStore {
        let snapshot = RealmSnapshot::from_json_str(&snapshot_json().to_string()).unwrap();
        InMemoryRealmStore::from_snapshot(snapshot)
    }

    #[test]
    fn test_user_lookup() {
        let store = store();
        assert_eq!(
            store.find_by_id("acme", "u-1").unwrap().unwrap().username,
            "alice"
        );
        assert!(!store.find_by_id("acme", "u-2").unwrap().unwrap().enabled);
        assert!(store.find_by_id("acme", "u-3").unwrap().is_none());
        assert!(store.find_by_id("other", "u-1").unwrap().is_none());
    }

    #[test]
    fn test_role_lookups() {
        let store = store();
        let portal = store.find_by_client_id("acme", "portal").unwrap().unwrap();

        assert_eq!(
            store.realm_role("acme", "admin").unwrap(),
            Some(Role::realm("admin"))
        );
        assert!(store.realm_role("acme", "viewer").unwrap().is_none());
        assert_eq!(
            store.client_role("acme", &portal, "viewer").unwrap(),
            Some(Role::client("c-1", "viewer"))
        );

        let held = store.role_mappings("acme", "u-1").unwrap();
        assert!(held.contains(&Role::realm("auditor")));
        assert!(held.contains(&Role::client("c-1", "viewer")));
        assert!(!held.contains(&Role::client("c-1", "admin")));
        assert!(store.role_mappings("acme", "u-2").unwrap().is_empty());
    }

    #[test]
    fn test_client_lookups() {
        let store = store();
        let clients = store.list_by_realm("acme").unwrap();
        assert_eq!(clients.len(), 2);
        assert!(clients.iter().any(|c| c.client_id == "billing" && c.public_client));
        assert!(store.list_by_realm("other").unwrap().is_empty());
    }

    #[test]
    fn test_scope_bindings() {
        let store = store();
        assert_eq!(store.list_scopes("acme").unwrap().len(), 2);
        assert_eq!(
            store.scope_ids_by_client("acme", "c-1", true).unwrap(),
            vec!["s-1".to_string()]
        );
        assert_eq!(
            store.scope_ids_by_client("acme", "c-1", false).unwrap(),
            vec!["s-2".to_string()]
        );
        assert!(store.scope_ids_by_client("acme", "c-2", true).unwrap().is_empty());
    }

    #[test]
    fn test_rebinding_scope_replaces_binding_type() {
        let store = store();
        store.bind_client_scope("acme", ClientScopeMapping::new("s-1", "c-1", false));

        assert!(store.scope_ids_by_client("acme", "c-1", true).unwrap().is_empty());
        assert_eq!(store.scope_ids_by_client("acme", "c-1", false).unwrap().len(), 2);
    }

    #[test]
    fn test_replacing_client_keeps_single_entry() {
        let store = store();
        store.add_client("acme", RealmClient::new("portal").with_id("c-1").public());

        let clients = store.list_by_realm("acme").unwrap();
        assert_eq!(clients.len(), 2);
        assert!(clients.iter().any(|c| c.id == "c-1" && c.public_client));
    }

    #[test]
    fn test_invalid_snapshot() {
        let err = RealmSnapshot::from_json_str("{\"users\": []}").unwrap_err();
        assert!(err.is_server_error());
        assert!(err.to_string().contains("invalid realm snapshot"));
    }

    #[test]
    fn test_snapshot_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realm.json");
        std::fs::write(&path, snapshot_json().to_string()).unwrap();

        let snapshot = RealmSnapshot::from_file(&path).unwrap();
        assert_eq!(snapshot.realm, "acme");
        assert!(RealmSnapshot::from_file(dir.path().join("missing.json")).is_err());

        let store = InMemoryRealmStore::from_snapshot(snapshot);
        assert_eq!(store.realm_names(), vec!["acme".to_string()]);
    }
}
