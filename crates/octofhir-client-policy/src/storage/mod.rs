//! Storage traits for realm data read during policy evaluation.
//!
//! This module defines read-only interfaces for:
//!
//! - Users and their role assignments
//! - Realm and client roles
//! - Registered clients
//! - Client scopes and their bindings to clients
//! - Client policies
//!
//! # Implementations
//!
//! [`InMemoryRealmStore`] implements all of them and can be loaded from a
//! JSON [`RealmSnapshot`]. Persistent backends implement the traits in
//! their own crates.

pub mod client;
pub mod client_scope;
pub mod memory;
pub mod policy;
pub mod role;
pub mod user;

pub use client::ClientStorage;
pub use client_scope::{ClientScope, ClientScopeMapping, ClientScopeMappingKey, ClientScopeStorage};
pub use memory::{ClientSnapshot, InMemoryRealmStore, RealmSnapshot, RoleMappingSnapshot};
pub use policy::ClientPolicyStorage;
pub use role::{Role, RoleContainer, RoleStorage};
pub use user::{User, UserStorage};
