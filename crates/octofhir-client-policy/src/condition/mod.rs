//! Client policy conditions.
//!
//! A condition inspects a [`ClientPolicyContext`] and casts a [`Vote`]:
//!
//! - `YES` - the policy applies to this event as far as the condition is concerned
//! - `NO` - the condition disqualifies the policy for this event
//! - `ABSTAIN` - the condition has no opinion (usually: event kind not handled)
//!
//! Conditions are built from a [`ComponentConfig`] by a
//! [`ConditionProviderFactory`]; the [`ConditionRegistry`] maps provider IDs
//! to factories.
//!
//! # Available Conditions
//!
//! | Provider ID | Condition |
//! |-------------|-----------|
//! | `clientupdatecontext-condition` | [`AuthMethodCondition`] |
//! | `clientupdatesourceroles-condition` | [`SourceRolesCondition`] |
//! | `clientupdatesourcehost-condition` | [`SourceHostCondition`] |
//! | `clientscopes-condition` | [`ClientScopesCondition`] |
//! | `anyclient-condition` | [`AnyClientCondition`] |

pub mod any_client;
pub mod auth_method;
pub mod client_scopes;
pub mod registry;
pub mod roles;
pub mod source_host;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ClientPolicyResult;
use crate::component::ComponentConfig;
use crate::context::ClientPolicyContext;
use crate::session::RealmSession;

pub use any_client::{AnyClientCondition, AnyClientConditionFactory};
pub use auth_method::{AuthMethod, AuthMethodCondition, AuthMethodConditionFactory};
pub use client_scopes::{ClientScopesCondition, ClientScopesConditionFactory, ScopeType};
pub use registry::{ConditionKind, ConditionRegistry};
pub use roles::{SourceRolesCondition, SourceRolesConditionFactory};
pub use source_host::{SourceHostCondition, SourceHostConditionFactory, TrustedHost};

/// Option shared by every condition: swap `YES` and `NO`.
pub const IS_NEGATIVE_LOGIC: &str = "is-negative-logic";

// =============================================================================
// Vote
// =============================================================================

/// A condition's verdict on one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vote {
    /// The condition is satisfied.
    Yes,
    /// The condition is not satisfied.
    No,
    /// The condition does not apply.
    Abstain,
}

impl Vote {
    /// `YES` if `matched`, otherwise `NO`.
    #[must_use]
    pub fn from_match(matched: bool) -> Self {
        if matched { Self::Yes } else { Self::No }
    }

    /// Swap `YES` and `NO`; `ABSTAIN` is unchanged.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
            Self::Abstain => Self::Abstain,
        }
    }

    #[must_use]
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }

    #[must_use]
    pub fn is_no(&self) -> bool {
        matches!(self, Self::No)
    }

    #[must_use]
    pub fn is_abstain(&self) -> bool {
        matches!(self, Self::Abstain)
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
            Self::Abstain => write!(f, "ABSTAIN"),
        }
    }
}

// =============================================================================
// Condition Provider
// =============================================================================

/// A configured condition.
///
/// Evaluation must not mutate the context or any realm data and must finish
/// in bounded time. Diagnostic logging is the only permitted side effect.
pub trait ConditionProvider: Send + Sync + fmt::Debug {
    /// Provider ID of the factory that built this condition.
    fn provider_id(&self) -> &str;

    /// Vote on an event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientPolicyError::Condition`](crate::ClientPolicyError::Condition)
    /// if the context cannot be interpreted, or a storage error if a realm
    /// lookup fails.
    fn evaluate(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote>;
}

/// Builds conditions of one kind from component configuration.
pub trait ConditionProviderFactory: Send + Sync {
    /// Unique provider ID.
    fn provider_id(&self) -> &'static str;

    /// Short description for administrators.
    fn help_text(&self) -> &'static str;

    /// Build a condition.
    ///
    /// Creation is lenient: options that fail validation are ignored where
    /// the condition can still run without them.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the condition cannot be built at all.
    fn create(&self, config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>>;

    /// Check a configuration at authoring time.
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid option.
    fn validate_configuration(&self, config: &ComponentConfig) -> ClientPolicyResult<()> {
        let _ = config;
        Ok(())
    }
}

// =============================================================================
// Negative Logic
// =============================================================================

/// Wraps a condition and swaps its `YES`/`NO` votes.
#[derive(Debug)]
pub struct NegatedCondition {
    inner: Box<dyn ConditionProvider>,
}

impl NegatedCondition {
    #[must_use]
    pub fn new(inner: Box<dyn ConditionProvider>) -> Self {
        Self { inner }
    }
}

impl ConditionProvider for NegatedCondition {
    fn provider_id(&self) -> &str {
        self.inner.provider_id()
    }

    fn evaluate(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote> {
        self.inner
            .evaluate(session, context)
            .map(Vote::negate)
    }
}
