//! Client-scopes condition.
//!
//! Votes `YES` when a client is (or is about to be) bound to one of the
//! configured client scopes, either as a default or as an optional scope.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::{ConditionProvider, ConditionProviderFactory, Vote};
use crate::ClientPolicyResult;
use crate::component::ComponentConfig;
use crate::context::{ClientPolicyContext, ClientPolicyEvent};
use crate::error::ClientPolicyError;
use crate::session::RealmSession;
use crate::types::RealmClient;

/// Provider ID.
pub const PROVIDER_ID: &str = "clientscopes-condition";

/// Option holding the scope names.
pub const SCOPES: &str = "scopes";

/// Option selecting the binding type (`Default` or `Optional`).
pub const TYPE: &str = "type";

/// Binding type of a client scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeType {
    /// Always granted.
    Default,
    /// Granted when requested.
    #[default]
    Optional,
}

impl ScopeType {
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Optional => write!(f, "Optional"),
        }
    }
}

impl FromStr for ScopeType {
    type Err = ClientPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("default") {
            Ok(Self::Default)
        } else if s.eq_ignore_ascii_case("optional") {
            Ok(Self::Optional)
        } else {
            Err(ClientPolicyError::configuration(format!(
                "option '{}' must be 'Default' or 'Optional', got '{}'",
                TYPE, s
            )))
        }
    }
}

// =============================================================================
// Condition
// =============================================================================

/// Votes on the client scopes bound to a client.
#[derive(Debug, Clone)]
pub struct ClientScopesCondition {
    scopes: Vec<String>,
    scope_type: ScopeType,
}

impl ClientScopesCondition {
    #[must_use]
    pub fn new<I, S>(scopes: I, scope_type: ScopeType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
            scope_type,
        }
    }

    /// Build from configuration; an unknown `type` falls back to `Optional`.
    #[must_use]
    pub fn from_config(config: &ComponentConfig) -> Self {
        let scope_type = match config.get_first(TYPE).map(str::parse::<ScopeType>) {
            None => ScopeType::default(),
            Some(Ok(scope_type)) => scope_type,
            Some(Err(e)) => {
                warn!(error = %e, "Falling back to optional client scopes");
                ScopeType::default()
            }
        };
        Self::new(config.get_list(SCOPES).iter().cloned(), scope_type)
    }

    #[must_use]
    pub fn scope_type(&self) -> ScopeType {
        self.scope_type
    }

    /// Names of the scopes bound to a stored client.
    fn stored_scope_names(
        &self,
        session: &RealmSession<'_>,
        client: &RealmClient,
    ) -> ClientPolicyResult<Vec<String>> {
        let realm = session.realm();
        let ids = session
            .scopes()
            .scope_ids_by_client(realm, &client.id, self.scope_type.is_default())?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<String, String> = session
            .scopes()
            .list_scopes(realm)?
            .into_iter()
            .map(|scope| (scope.id, scope.name))
            .collect();

        Ok(ids.iter().filter_map(|id| names.get(id).cloned()).collect())
    }

    /// Names of the scopes that apply to the event, or `None` if the event
    /// is not handled.
    fn bound_scope_names(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Option<Vec<String>>> {
        let default_scope = self.scope_type.is_default();
        let requested = context
            .representation()
            .and_then(|rep| rep.client_scopes(default_scope))
            .map(<[String]>::to_vec);

        let names = match context.event() {
            ClientPolicyEvent::Register => requested.unwrap_or_default(),
            ClientPolicyEvent::Update => match (requested, context.target_client()) {
                (Some(requested), _) => requested,
                (None, Some(client)) => self.stored_scope_names(session, client)?,
                (None, None) => Vec::new(),
            },
            ClientPolicyEvent::AuthorizationRequest
            | ClientPolicyEvent::TokenRequest
            | ClientPolicyEvent::TokenRefresh => match context.target_client() {
                Some(client) => self.stored_scope_names(session, client)?,
                None => Vec::new(),
            },
            _ => return Ok(None),
        };

        Ok(Some(names))
    }
}

impl ConditionProvider for ClientScopesCondition {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn evaluate(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote> {
        let Some(bound) = self.bound_scope_names(session, context)? else {
            return Ok(Vote::Abstain);
        };

        if self.scopes.is_empty() {
            debug!("No client scopes configured");
            return Ok(Vote::No);
        }

        trace!(
            scope_type = %self.scope_type,
            bound = ?bound,
            expected = ?self.scopes,
            "Checking client scopes"
        );

        Ok(Vote::from_match(
            self.scopes.iter().any(|scope| bound.contains(scope)),
        ))
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Factory for [`ClientScopesCondition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientScopesConditionFactory;

impl ConditionProviderFactory for ClientScopesConditionFactory {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn help_text(&self) -> &'static str {
        "The condition checks the client scopes bound to the client."
    }

    fn create(&self, config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
        Ok(Box::new(ClientScopesCondition::from_config(config)))
    }

    fn validate_configuration(&self, config: &ComponentConfig) -> ClientPolicyResult<()> {
        if let Some(raw) = config.get_first(TYPE) {
            raw.parse::<ScopeType>()?;
        }
        Ok(())
    }
}
