//! # octofhir-client-policy
//!
//! Client policy evaluation for the OctoFHIR authorization server.
//!
//! Client policies decide, for every client-lifecycle event (registration,
//! update and protocol requests made on behalf of a client), whether a
//! configured set of named policies applies. The caller then runs the
//! executors of the policies that apply.
//!
//! ## Overview
//!
//! A trigger builds a [`ClientPolicyContext`]; the [`ClientPolicyManager`]
//! asks every enabled policy of the realm for a verdict by polling its
//! conditions, and returns the per-policy decisions. Evaluation is
//! synchronous, read-only and deterministic.
//!
//! ## Modules
//!
//! - [`config`] - Client policy configuration
//! - [`context`] - Events and evaluation context
//! - [`component`] - Multivalued component configuration
//! - [`condition`] - Condition providers, factories and registry
//! - [`policy`] - Policy model, aggregation and the policy manager
//! - [`session`] - Realm-scoped read access for conditions
//! - [`storage`] - Storage traits and the in-memory store
//! - [`types`] - Clients, tokens and connection info

pub mod component;
pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod policy;
pub mod session;
pub mod storage;
pub mod types;

pub use component::{ComponentConfig, ComponentModel};
pub use condition::{
    AuthMethod, ConditionKind, ConditionProvider, ConditionProviderFactory, ConditionRegistry,
    Vote,
};
pub use config::{ClientPolicyConfig, ConfigError, LoggingConfig};
pub use context::{ClientPolicyContext, ClientPolicyContextBuilder, ClientPolicyEvent, ContextOrigin};
pub use error::{ClientPolicyError, ErrorCategory};
pub use policy::{
    ClientPolicy, ClientPolicyManager, ClientPolicyRepresentation, ClientPolicySet,
    ExecutorReference, PolicyDecision, RealmEvaluation,
};
pub use session::RealmSession;
pub use storage::{
    ClientPolicyStorage, ClientScopeStorage, ClientStorage, InMemoryRealmStore, RealmSnapshot,
    Role, RoleStorage, User, UserStorage,
};
pub use types::{ClientRepresentation, ConnectionInfo, RealmClient, RegistrationToken};

/// Type alias for client policy results.
pub type ClientPolicyResult<T> = Result<T, ClientPolicyError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use octofhir_client_policy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ClientPolicyResult;
    pub use crate::component::{ComponentConfig, ComponentModel};
    pub use crate::condition::{
        AuthMethod, ConditionKind, ConditionProvider, ConditionProviderFactory,
        ConditionRegistry, Vote,
    };
    pub use crate::config::{ClientPolicyConfig, ConfigError};
    pub use crate::context::{ClientPolicyContext, ClientPolicyEvent, ContextOrigin};
    pub use crate::error::{ClientPolicyError, ErrorCategory};
    pub use crate::policy::{
        ClientPolicyManager, ClientPolicyRepresentation, ClientPolicySet, ExecutorReference,
        PolicyDecision, RealmEvaluation,
    };
    pub use crate::session::RealmSession;
    pub use crate::storage::{InMemoryRealmStore, RealmSnapshot, Role, User};
    pub use crate::types::{ClientRepresentation, ConnectionInfo, RealmClient, RegistrationToken};
}
