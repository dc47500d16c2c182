//! Condition provider registry.
//!
//! Maps provider IDs to the factories that build and validate conditions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use super::{
    AnyClientConditionFactory, AuthMethodConditionFactory, ClientScopesConditionFactory,
    ConditionProvider, ConditionProviderFactory, IS_NEGATIVE_LOGIC, NegatedCondition,
    SourceHostConditionFactory, SourceRolesConditionFactory, any_client, auth_method,
    client_scopes, roles, source_host,
};
use crate::ClientPolicyResult;
use crate::component::ComponentModel;
use crate::error::ClientPolicyError;

// =============================================================================
// Condition Kind
// =============================================================================

/// The built-in condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// Authentication method of a register/update.
    AuthMethod,
    /// Roles of the principal behind a register/update.
    SourceRoles,
    /// Network origin of a register/update.
    SourceHost,
    /// Client scopes bound to the client.
    ClientScopes,
    /// Every client.
    AnyClient,
}

impl ConditionKind {
    pub const ALL: [Self; 5] = [
        Self::AuthMethod,
        Self::SourceRoles,
        Self::SourceHost,
        Self::ClientScopes,
        Self::AnyClient,
    ];

    /// The factory building conditions of this kind.
    #[must_use]
    pub fn factory(&self) -> Arc<dyn ConditionProviderFactory> {
        match self {
            Self::AuthMethod => Arc::new(AuthMethodConditionFactory),
            Self::SourceRoles => Arc::new(SourceRolesConditionFactory),
            Self::SourceHost => Arc::new(SourceHostConditionFactory),
            Self::ClientScopes => Arc::new(ClientScopesConditionFactory),
            Self::AnyClient => Arc::new(AnyClientConditionFactory),
        }
    }

    #[must_use]
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::AuthMethod => auth_method::PROVIDER_ID,
            Self::SourceRoles => roles::PROVIDER_ID,
            Self::SourceHost => source_host::PROVIDER_ID,
            Self::ClientScopes => client_scopes::PROVIDER_ID,
            Self::AnyClient => any_client::PROVIDER_ID,
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

impl FromStr for ConditionKind {
    type Err = ClientPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.provider_id() == s)
            .ok_or_else(|| ClientPolicyError::unknown_provider(s))
    }
}

// =============================================================================
// Condition Registry
// =============================================================================

/// Registry of condition provider factories keyed by provider ID.
#[derive(Clone, Default)]
pub struct ConditionRegistry {
    factories: BTreeMap<String, Arc<dyn ConditionProviderFactory>>,
}

impl ConditionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in condition kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in ConditionKind::ALL {
            registry.register_shared(kind.factory());
        }
        registry
    }

    /// Register a factory, replacing any factory with the same provider ID.
    pub fn register(&mut self, factory: impl ConditionProviderFactory + 'static) {
        self.register_shared(Arc::new(factory));
    }

    /// Register a shared factory, replacing any factory with the same
    /// provider ID.
    pub fn register_shared(&mut self, factory: Arc<dyn ConditionProviderFactory>) {
        self.factories
            .insert(factory.provider_id().to_string(), factory);
    }

    /// Look up a factory.
    #[must_use]
    pub fn get(&self, provider_id: &str) -> Option<&dyn ConditionProviderFactory> {
        self.factories.get(provider_id).map(|factory| factory.as_ref())
    }

    /// Registered factories in provider ID order.
    pub fn factories(&self) -> impl Iterator<Item = &dyn ConditionProviderFactory> {
        self.factories.values().map(|factory| factory.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn factory(&self, provider_id: &str) -> ClientPolicyResult<&dyn ConditionProviderFactory> {
        self.get(provider_id)
            .ok_or_else(|| ClientPolicyError::unknown_provider(provider_id))
    }

    /// Build the condition described by a component.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` if no factory is registered for the
    /// component, or the factory's configuration error.
    pub fn create(&self, component: &ComponentModel) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
        let factory = self.factory(&component.provider_id)?;
        let condition = factory.create(&component.config)?;

        if component.config.get_bool_or_default(IS_NEGATIVE_LOGIC, false) {
            debug!(provider_id = %component.provider_id, "Condition uses negative logic");
            return Ok(Box::new(NegatedCondition::new(condition)));
        }
        Ok(condition)
    }

    /// Validate a component's configuration.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` or a configuration error.
    pub fn validate(&self, component: &ComponentModel) -> ClientPolicyResult<()> {
        let factory = self.factory(&component.provider_id)?;
        component.config.get_bool(IS_NEGATIVE_LOGIC, false)?;
        factory.validate_configuration(&component.config)
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("providers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentConfig;
    use crate::condition::Vote;
    use crate::context::{ClientPolicyContext, ClientPolicyEvent};
    use crate::session::RealmSession;
    use crate::storage::InMemoryRealmStore;

    #[test]
    fn test_defaults_cover_every_kind() {
        let registry = ConditionRegistry::with_defaults();
        assert_eq!(registry.len(), ConditionKind::ALL.len());
        for kind in ConditionKind::ALL {
            assert!(registry.get(kind.provider_id()).is_some(), "{}", kind);
            assert_eq!(kind.provider_id().parse::<ConditionKind>().unwrap(), kind);
            assert_eq!(kind.factory().provider_id(), kind.provider_id());
        }
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ConditionRegistry::with_defaults();
        let component = ComponentModel::new("no-such-condition", ComponentConfig::new());

        assert!(matches!(
            registry.create(&component).unwrap_err(),
            ClientPolicyError::UnknownProvider { .. }
        ));
        assert!(registry.validate(&component).is_err());
        assert!("no-such-condition".parse::<ConditionKind>().is_err());
    }

    #[test]
    fn test_negative_logic_wraps_condition() {
        let registry = ConditionRegistry::with_defaults();
        let store = InMemoryRealmStore::new();
        let session = RealmSession::new("test", &store);
        let ctx = ClientPolicyContext::builder(ClientPolicyEvent::View).build();

        let negated = ComponentModel::new(
            "anyclient-condition",
            ComponentConfig::new().with_single(IS_NEGATIVE_LOGIC, "true"),
        );
        let condition = registry.create(&negated).unwrap();
        assert_eq!(condition.provider_id(), "anyclient-condition");
        assert_eq!(condition.evaluate(&session, &ctx).unwrap(), Vote::No);
    }

    #[test]
    fn test_negative_logic_keeps_abstain() {
        let registry = ConditionRegistry::with_defaults();
        let store = InMemoryRealmStore::new();
        let session = RealmSession::new("test", &store);
        let ctx = ClientPolicyContext::builder(ClientPolicyEvent::View).build();

        let negated = ComponentModel::new(
            "clientupdatecontext-condition",
            ComponentConfig::new()
                .with(crate::condition::auth_method::EXPECTED_AUTH_METHODS, ["ANONYMOUS"])
                .with_single(IS_NEGATIVE_LOGIC, "true"),
        );
        let condition = registry.create(&negated).unwrap();
        assert_eq!(condition.evaluate(&session, &ctx).unwrap(), Vote::Abstain);
    }

    #[test]
    fn test_validate_rejects_non_boolean_negative_logic() {
        let registry = ConditionRegistry::with_defaults();
        let component = ComponentModel::new(
            "anyclient-condition",
            ComponentConfig::new().with_single(IS_NEGATIVE_LOGIC, "sometimes"),
        );

        let err = registry.validate(&component).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_register_custom_factory() {
        #[derive(Debug)]
        struct Never;

        impl ConditionProvider for Never {
            fn provider_id(&self) -> &str {
                "never-condition"
            }

            fn evaluate(
                &self,
                _session: &RealmSession<'_>,
                _context: &ClientPolicyContext,
            ) -> ClientPolicyResult<Vote> {
                Ok(Vote::No)
            }
        }

        struct NeverFactory;

        impl ConditionProviderFactory for NeverFactory {
            fn provider_id(&self) -> &'static str {
                "never-condition"
            }

            fn help_text(&self) -> &'static str {
                "Never matches."
            }

            fn create(&self, _config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
                Ok(Box::new(Never))
            }
        }

        let mut registry = ConditionRegistry::with_defaults();
        registry.register(NeverFactory);

        assert_eq!(registry.len(), 6);
        let component = ComponentModel::new("never-condition", ComponentConfig::new());
        assert!(registry.validate(&component).is_ok());
        assert_eq!(registry.create(&component).unwrap().provider_id(), "never-condition");
    }
}
