//! Authentication-method condition.
//!
//! Classifies how the caller of a client registration or update
//! authenticated, and votes `YES` when that method is one of the
//! configured `expected-auth-methods`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{ConditionProvider, ConditionProviderFactory, Vote};
use crate::ClientPolicyResult;
use crate::component::ComponentConfig;
use crate::context::ClientPolicyContext;
use crate::error::ClientPolicyError;
use crate::session::RealmSession;

/// Provider ID.
pub const PROVIDER_ID: &str = "clientupdatecontext-condition";

/// Option holding the accepted authentication methods.
pub const EXPECTED_AUTH_METHODS: &str = "expected-auth-methods";

// =============================================================================
// Auth Method
// =============================================================================

/// How the caller of a registration or update authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthMethod {
    /// No credentials, or a bearer token with no resolved principal.
    Anonymous,
    /// A dynamic registration initial access token.
    ByInitialAccessToken,
    /// A dynamic registration access token.
    ByRegistrationAccessToken,
    /// A bearer token of a logged-in user or authenticated client.
    ByAuthenticatedUser,
}

impl AuthMethod {
    /// All methods, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Anonymous,
        Self::ByInitialAccessToken,
        Self::ByRegistrationAccessToken,
        Self::ByAuthenticatedUser,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "ANONYMOUS",
            Self::ByInitialAccessToken => "BY_INITIAL_ACCESS_TOKEN",
            Self::ByRegistrationAccessToken => "BY_REGISTRATION_ACCESS_TOKEN",
            Self::ByAuthenticatedUser => "BY_AUTHENTICATED_USER",
        }
    }

    /// Classify the caller of an event.
    ///
    /// Returns `None` when the token type is not recognized.
    #[must_use]
    pub fn classify(context: &ClientPolicyContext) -> Option<Self> {
        let Some(token) = context.token() else {
            return Some(Self::Anonymous);
        };

        if token.is_initial_access_token() {
            Some(Self::ByInitialAccessToken)
        } else if token.is_registration_access_token() {
            Some(Self::ByRegistrationAccessToken)
        } else if token.is_bearer_token() {
            if context.authenticated_user().is_some() || context.authenticated_client().is_some()
            {
                Some(Self::ByAuthenticatedUser)
            } else {
                Some(Self::Anonymous)
            }
        } else {
            None
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = ClientPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                ClientPolicyError::configuration(format!(
                    "unknown authentication method '{}'",
                    s
                ))
            })
    }
}

// =============================================================================
// Condition
// =============================================================================

/// Votes on the authentication method of a register/update.
#[derive(Debug, Clone)]
pub struct AuthMethodCondition {
    expected: Vec<AuthMethod>,
}

impl AuthMethodCondition {
    /// Create a condition accepting the given methods.
    #[must_use]
    pub fn new(expected: Vec<AuthMethod>) -> Self {
        Self { expected }
    }

    /// Build from configuration, skipping unknown method names.
    #[must_use]
    pub fn from_config(config: &ComponentConfig) -> Self {
        let expected = config
            .get_list(EXPECTED_AUTH_METHODS)
            .iter()
            .filter_map(|raw| match raw.parse::<AuthMethod>() {
                Ok(method) => Some(method),
                Err(_) => {
                    warn!(method = %raw, "Ignoring unknown expected auth method");
                    None
                }
            })
            .collect();
        Self { expected }
    }

    #[must_use]
    pub fn expected(&self) -> &[AuthMethod] {
        &self.expected
    }
}

impl ConditionProvider for AuthMethodCondition {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn evaluate(
        &self,
        _session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote> {
        if !context.event().is_register_or_update() {
            return Ok(Vote::Abstain);
        }

        let Some(method) = AuthMethod::classify(context) else {
            debug!(
                token_type = context.token().map(|t| t.token_type.as_str()),
                "Authentication method could not be determined"
            );
            return Ok(Vote::No);
        };

        trace!(
            auth_method = %method,
            expected = ?self.expected,
            "Classified authentication method"
        );

        Ok(Vote::from_match(self.expected.contains(&method)))
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Factory for [`AuthMethodCondition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthMethodConditionFactory;

impl ConditionProviderFactory for AuthMethodConditionFactory {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn help_text(&self) -> &'static str {
        "The condition checks how the caller of a client registration or update authenticated."
    }

    fn create(&self, config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
        Ok(Box::new(AuthMethodCondition::from_config(config)))
    }

    fn validate_configuration(&self, config: &ComponentConfig) -> ClientPolicyResult<()> {
        for raw in config.get_list(EXPECTED_AUTH_METHODS) {
            raw.parse::<AuthMethod>()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClientPolicyEvent;
    use crate::storage::{InMemoryRealmStore, User};
    use crate::types::{ClientRepresentation, RealmClient, RegistrationToken};

    // -------------------------------------------------------------------------
    // Test Helpers
    // -------------------------------------------------------------------------

    fn evaluate(condition: &AuthMethodCondition, context: &ClientPolicyContext) -> Vote {
        let store = InMemoryRealmStore::new();
        let session = RealmSession::new("test", &store);
        condition.evaluate(&session, context).unwrap()
    }

    fn register_with(token: Option<RegistrationToken>) -> ClientPolicyContext {
        ClientPolicyContext::dynamic_register(token, ClientRepresentation::new("app"))
    }

    // -------------------------------------------------------------------------
    // Classification
    // -------------------------------------------------------------------------

    #[test]
    fn test_no_token_is_anonymous() {
        assert_eq!(
            AuthMethod::classify(&register_with(None)),
            Some(AuthMethod::Anonymous)
        );
    }

    #[test]
    fn test_initial_access_token_ignores_user() {
        let ctx = ClientPolicyContext::builder(ClientPolicyEvent::Register)
            .dynamic_registration()
            .with_token(RegistrationToken::initial_access())
            .with_authenticated_user(User::new("u-1", "alice"))
            .build();

        assert_eq!(
            AuthMethod::classify(&ctx),
            Some(AuthMethod::ByInitialAccessToken)
        );
    }

    #[test]
    fn test_registration_access_token() {
        assert_eq!(
            AuthMethod::classify(&register_with(Some(RegistrationToken::registration_access()))),
            Some(AuthMethod::ByRegistrationAccessToken)
        );
    }

    #[test]
    fn test_bearer_requires_principal() {
        assert_eq!(
            AuthMethod::classify(&register_with(Some(RegistrationToken::bearer()))),
            Some(AuthMethod::Anonymous)
        );

        let with_user = ClientPolicyContext::builder(ClientPolicyEvent::Register)
            .with_token(RegistrationToken::bearer())
            .with_authenticated_user(User::new("u-1", "alice"))
            .build();
        assert_eq!(
            AuthMethod::classify(&with_user),
            Some(AuthMethod::ByAuthenticatedUser)
        );

        let with_client = ClientPolicyContext::builder(ClientPolicyEvent::Update)
            .with_token(RegistrationToken::bearer())
            .with_authenticated_client(RealmClient::new("admin-cli"))
            .build();
        assert_eq!(
            AuthMethod::classify(&with_client),
            Some(AuthMethod::ByAuthenticatedUser)
        );
    }

    #[test]
    fn test_unknown_token_type_is_undetermined() {
        let ctx = register_with(Some(RegistrationToken::new("Refresh")));
        assert_eq!(AuthMethod::classify(&ctx), None);
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in AuthMethod::ALL {
            assert_eq!(method.as_str().parse::<AuthMethod>().unwrap(), method);
        }
        assert!("anonymous".parse::<AuthMethod>().is_err());
    }

    // -------------------------------------------------------------------------
    // Voting
    // -------------------------------------------------------------------------

    #[test]
    fn test_vote_yes_when_expected() {
        let condition = AuthMethodCondition::new(vec![AuthMethod::ByInitialAccessToken]);
        let ctx = register_with(Some(RegistrationToken::initial_access()));
        assert_eq!(evaluate(&condition, &ctx), Vote::Yes);
    }

    #[test]
    fn test_vote_no_when_not_expected() {
        let condition = AuthMethodCondition::new(vec![AuthMethod::ByAuthenticatedUser]);
        assert_eq!(evaluate(&condition, &register_with(None)), Vote::No);
    }

    #[test]
    fn test_vote_no_with_empty_allow_list() {
        let condition = AuthMethodCondition::from_config(&ComponentConfig::new());
        assert!(condition.expected().is_empty());
        assert_eq!(evaluate(&condition, &register_with(None)), Vote::No);
    }

    #[test]
    fn test_vote_no_when_undetermined() {
        let condition = AuthMethodCondition::new(AuthMethod::ALL.to_vec());
        let ctx = register_with(Some(RegistrationToken::new("Refresh")));
        assert_eq!(evaluate(&condition, &ctx), Vote::No);
    }

    #[test]
    fn test_abstains_outside_register_and_update() {
        let condition = AuthMethodCondition::new(AuthMethod::ALL.to_vec());
        for event in ClientPolicyEvent::ALL {
            if event.is_register_or_update() {
                continue;
            }
            let ctx = ClientPolicyContext::builder(event).build();
            assert_eq!(evaluate(&condition, &ctx), Vote::Abstain, "{}", event);
        }
    }

    // -------------------------------------------------------------------------
    // Factory
    // -------------------------------------------------------------------------

    #[test]
    fn test_factory_skips_unknown_methods() {
        let config = ComponentConfig::new().with(
            EXPECTED_AUTH_METHODS,
            ["ANONYMOUS", "BY_MAGIC", "BY_INITIAL_ACCESS_TOKEN"],
        );
        let condition = AuthMethodCondition::from_config(&config);
        assert_eq!(
            condition.expected(),
            &[AuthMethod::Anonymous, AuthMethod::ByInitialAccessToken]
        );

        let err = AuthMethodConditionFactory
            .validate_configuration(&config)
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("BY_MAGIC"));
    }
}
