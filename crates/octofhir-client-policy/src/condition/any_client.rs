//! Condition matching every client and every event.

use super::{ConditionProvider, ConditionProviderFactory, Vote};
use crate::ClientPolicyResult;
use crate::component::ComponentConfig;
use crate::context::ClientPolicyContext;
use crate::session::RealmSession;

/// Provider ID.
pub const PROVIDER_ID: &str = "anyclient-condition";

/// Always votes `YES`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyClientCondition;

impl ConditionProvider for AnyClientCondition {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn evaluate(
        &self,
        _session: &RealmSession<'_>,
        _context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote> {
        Ok(Vote::Yes)
    }
}

/// Factory for [`AnyClientCondition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyClientConditionFactory;

impl ConditionProviderFactory for AnyClientConditionFactory {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn help_text(&self) -> &'static str {
        "The condition is satisfied by any client on any event."
    }

    fn create(&self, _config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
        Ok(Box::new(AnyClientCondition))
    }
}
