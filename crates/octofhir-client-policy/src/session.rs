//! Realm-scoped view of storage used by conditions.

use std::fmt;

use crate::storage::{ClientScopeStorage, ClientStorage, RoleStorage, UserStorage};

/// Read-only access to one realm's data during an evaluation.
///
/// Conditions only look things up; nothing reached through a session is
/// ever mutated by evaluation.
#[derive(Clone, Copy)]
pub struct RealmSession<'a> {
    realm: &'a str,
    users: &'a dyn UserStorage,
    roles: &'a dyn RoleStorage,
    clients: &'a dyn ClientStorage,
    scopes: &'a dyn ClientScopeStorage,
}

impl<'a> RealmSession<'a> {
    /// Create a session backed by a store implementing every lookup.
    pub fn new<S>(realm: &'a str, store: &'a S) -> Self
    where
        S: UserStorage + RoleStorage + ClientStorage + ClientScopeStorage,
    {
        Self {
            realm,
            users: store,
            roles: store,
            clients: store,
            scopes: store,
        }
    }

    /// Create a session from separate storage implementations.
    pub fn from_parts(
        realm: &'a str,
        users: &'a dyn UserStorage,
        roles: &'a dyn RoleStorage,
        clients: &'a dyn ClientStorage,
        scopes: &'a dyn ClientScopeStorage,
    ) -> Self {
        Self {
            realm,
            users,
            roles,
            clients,
            scopes,
        }
    }

    /// Name of the current realm.
    #[must_use]
    pub fn realm(&self) -> &'a str {
        self.realm
    }

    #[must_use]
    pub fn users(&self) -> &'a dyn UserStorage {
        self.users
    }

    #[must_use]
    pub fn roles(&self) -> &'a dyn RoleStorage {
        self.roles
    }

    #[must_use]
    pub fn clients(&self) -> &'a dyn ClientStorage {
        self.clients
    }

    #[must_use]
    pub fn scopes(&self) -> &'a dyn ClientScopeStorage {
        self.scopes
    }
}

impl fmt::Debug for RealmSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealmSession")
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}
