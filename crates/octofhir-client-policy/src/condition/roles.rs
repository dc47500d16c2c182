//! Source-roles condition.
//!
//! Votes `YES` when the principal performing a client registration or
//! update holds at least one of the configured roles, looked up in the
//! realm namespace first and then in every client of the realm.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::{ConditionProvider, ConditionProviderFactory, Vote};
use crate::ClientPolicyResult;
use crate::component::ComponentConfig;
use crate::context::{ClientPolicyContext, ContextOrigin};
use crate::error::ClientPolicyError;
use crate::session::RealmSession;
use crate::storage::{Role, User};

/// Provider ID.
pub const PROVIDER_ID: &str = "clientupdatesourceroles-condition";

/// Option holding the expected role names.
pub const ROLES: &str = "roles";

/// Votes on the roles of the principal behind a register/update.
#[derive(Debug, Clone)]
pub struct SourceRolesCondition {
    roles: Vec<String>,
}

impl SourceRolesCondition {
    /// Create a condition expecting any of the given role names.
    #[must_use]
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ComponentConfig) -> Self {
        Self::new(config.get_list(ROLES).iter().cloned())
    }

    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Resolve who performed the action.
    fn principal(
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Option<User>> {
        match context.origin() {
            ContextOrigin::AdminConsole => Ok(context.authenticated_user().cloned()),
            ContextOrigin::DynamicRegistration => {
                let Some(subject) = context.token().and_then(|t| t.subject.as_deref()) else {
                    return Ok(None);
                };
                session.users().find_by_id(session.realm(), subject)
            }
            ContextOrigin::Protocol => Err(ClientPolicyError::unexpected_context(format!(
                "{} cannot resolve the principal of a {} event from a {} context",
                PROVIDER_ID,
                context.event(),
                context.origin()
            ))),
        }
    }

    /// Returns `true` if `held` contains a realm or client role named `name`.
    fn is_role_held(
        session: &RealmSession<'_>,
        held: &HashSet<Role>,
        name: &str,
    ) -> ClientPolicyResult<bool> {
        let realm = session.realm();

        if let Some(role) = session.roles().realm_role(realm, name)?
            && held.contains(&role)
        {
            return Ok(true);
        }

        for client in session.clients().list_by_realm(realm)? {
            if let Some(role) = session.roles().client_role(realm, &client, name)?
                && held.contains(&role)
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl ConditionProvider for SourceRolesCondition {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn evaluate(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote> {
        if !context.event().is_register_or_update() {
            return Ok(Vote::Abstain);
        }

        let Some(user) = Self::principal(session, context)? else {
            debug!(origin = %context.origin(), "No principal resolved for role check");
            return Ok(Vote::No);
        };

        if self.roles.is_empty() {
            debug!("No expected roles configured");
            return Ok(Vote::No);
        }

        let held = session.roles().role_mappings(session.realm(), &user.id)?;

        trace!(
            user_id = %user.id,
            held = ?held.iter().map(ToString::to_string).collect::<Vec<_>>(),
            expected = ?self.roles,
            "Checking principal roles"
        );

        for name in &self.roles {
            if Self::is_role_held(session, &held, name)? {
                trace!(user_id = %user.id, role = %name, "Expected role held");
                return Ok(Vote::Yes);
            }
        }

        Ok(Vote::No)
    }
}

/// Factory for [`SourceRolesCondition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRolesConditionFactory;

impl ConditionProviderFactory for SourceRolesConditionFactory {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn help_text(&self) -> &'static str {
        "The condition checks the roles of the entity that tries to register or update a client."
    }

    fn create(&self, config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
        Ok(Box::new(SourceRolesCondition::from_config(config)))
    }
}
