//! Client policy evaluation.
//!
//! Each enabled policy of a realm is evaluated independently by polling its
//! conditions in order and combining their votes:
//!
//! - any `NO` → `NO`
//! - otherwise any `YES` → `YES`
//! - otherwise (all `ABSTAIN`, or no conditions) → `ABSTAIN`
//!
//! The realm result is the list of per-policy decisions. There is no global
//! verdict: the caller runs the executors of every policy that voted `YES`.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_client_policy::policy::ClientPolicyManager;
//! use std::sync::Arc;
//!
//! let manager = ClientPolicyManager::new(
//!     ClientPolicyConfig::default(),
//!     ConditionRegistry::with_defaults(),
//!     Arc::new(store),
//! );
//!
//! let evaluation = manager.evaluate(&session, &context)?;
//! for executor in evaluation.executors_to_run() {
//!     // Run executor
//! }
//! ```

use std::sync::Arc;

use serde::Serialize;

use super::model::{ClientPolicyRepresentation, ExecutorReference};
use crate::ClientPolicyResult;
use crate::condition::{ConditionProvider, ConditionRegistry, Vote};
use crate::config::ClientPolicyConfig;
use crate::context::{ClientPolicyContext, ClientPolicyEvent};
use crate::session::RealmSession;
use crate::storage::ClientPolicyStorage;

/// Combine condition votes into a policy vote.
#[must_use]
pub fn aggregate<I>(votes: I) -> Vote
where
    I: IntoIterator<Item = Vote>,
{
    let mut result = Vote::Abstain;
    for vote in votes {
        match vote {
            Vote::No => return Vote::No,
            Vote::Yes => result = Vote::Yes,
            Vote::Abstain => {}
        }
    }
    result
}

// =============================================================================
// Decisions
// =============================================================================

/// Vote of one condition within a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionVote {
    /// Condition display name.
    pub condition: String,
    /// Provider ID of the condition.
    pub provider_id: String,
    pub vote: Vote,
}

/// Verdict of one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    pub policy_name: String,

    pub vote: Vote,

    /// Votes of the conditions that were polled, in order.
    pub condition_votes: Vec<ConditionVote>,

    /// Executors of the policy.
    pub executors: Vec<ExecutorReference>,
}

impl PolicyDecision {
    /// Returns `true` if the policy applies to the event.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.vote.is_yes()
    }
}

/// Result of evaluating every enabled policy of a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmEvaluation {
    pub realm: String,
    pub event: ClientPolicyEvent,

    /// One decision per enabled policy, in policy order.
    pub decisions: Vec<PolicyDecision>,
}

impl RealmEvaluation {
    /// An evaluation with no decisions.
    #[must_use]
    pub fn empty(realm: impl Into<String>, event: ClientPolicyEvent) -> Self {
        Self {
            realm: realm.into(),
            event,
            decisions: Vec::new(),
        }
    }

    /// Decisions of the policies that voted `YES`.
    pub fn matched_policies(&self) -> impl Iterator<Item = &PolicyDecision> {
        self.decisions.iter().filter(|d| d.is_match())
    }

    /// Union of the executors of matched policies, in policy order.
    #[must_use]
    pub fn executors_to_run(&self) -> Vec<&ExecutorReference> {
        let mut executors: Vec<&ExecutorReference> = Vec::new();
        for executor in self.matched_policies().flat_map(|d| d.executors.iter()) {
            if !executors.contains(&executor) {
                executors.push(executor);
            }
        }
        executors
    }

    /// Decision of a policy by name.
    #[must_use]
    pub fn decision(&self, policy_name: &str) -> Option<&PolicyDecision> {
        self.decisions.iter().find(|d| d.policy_name == policy_name)
    }
}

// =============================================================================
// Client Policy
// =============================================================================

/// A compiled client policy.
#[derive(Debug)]
pub struct ClientPolicy {
    name: String,
    enabled: bool,
    conditions: Vec<(String, Box<dyn ConditionProvider>)>,
    executors: Vec<ExecutorReference>,
}

impl ClientPolicy {
    /// Create a policy from named conditions.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        enabled: bool,
        conditions: Vec<(String, Box<dyn ConditionProvider>)>,
        executors: Vec<ExecutorReference>,
    ) -> Self {
        Self {
            name: name.into(),
            enabled,
            conditions,
            executors,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn executors(&self) -> &[ExecutorReference] {
        &self.executors
    }

    /// Display names of the conditions, in order.
    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(name, _)| name.as_str())
    }

    /// Poll the conditions and combine their votes.
    ///
    /// With `short_circuit`, polling stops at the first `NO`; the resulting
    /// vote is the same either way.
    ///
    /// # Errors
    ///
    /// Propagates the first condition error.
    pub fn evaluate(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
        short_circuit: bool,
    ) -> ClientPolicyResult<PolicyDecision> {
        let mut condition_votes = Vec::with_capacity(self.conditions.len());

        for (name, condition) in &self.conditions {
            let vote = condition.evaluate(session, context)?;

            tracing::debug!(
                policy_name = %self.name,
                condition = %name,
                provider_id = %condition.provider_id(),
                vote = %vote,
                "Condition evaluated"
            );

            condition_votes.push(ConditionVote {
                condition: name.clone(),
                provider_id: condition.provider_id().to_string(),
                vote,
            });

            if short_circuit && vote.is_no() {
                break;
            }
        }

        let vote = aggregate(condition_votes.iter().map(|cv| cv.vote));

        Ok(PolicyDecision {
            policy_name: self.name.clone(),
            vote,
            condition_votes,
            executors: self.executors.clone(),
        })
    }
}

// =============================================================================
// Client Policy Manager
// =============================================================================

/// Evaluates the client policies of a realm.
///
/// The manager holds no per-request state and may be shared across threads.
pub struct ClientPolicyManager {
    config: ClientPolicyConfig,
    registry: ConditionRegistry,
    storage: Arc<dyn ClientPolicyStorage>,
}

impl ClientPolicyManager {
    #[must_use]
    pub fn new(
        config: ClientPolicyConfig,
        registry: ConditionRegistry,
        storage: Arc<dyn ClientPolicyStorage>,
    ) -> Self {
        Self {
            config,
            registry,
            storage,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientPolicyConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// Compile the enabled policies of a realm, in authoring order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if policies cannot be loaded, or the error
    /// raised while compiling a policy.
    pub fn load_policies(&self, realm: &str) -> ClientPolicyResult<Vec<ClientPolicy>> {
        self.storage
            .find_by_realm(realm)?
            .iter()
            .filter(|policy| policy.enabled)
            .map(|policy| policy.compile(&self.registry))
            .collect()
    }

    /// Evaluate every enabled policy of the session's realm.
    ///
    /// # Errors
    ///
    /// Returns the first storage or condition error; no partial result is
    /// produced.
    pub fn evaluate(
        &self,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<RealmEvaluation> {
        let realm = session.realm();
        let mut evaluation = RealmEvaluation::empty(realm, context.event());

        if !self.config.enabled {
            tracing::trace!(realm = %realm, "Client policies disabled");
            return Ok(evaluation);
        }

        let policies = self.load_policies(realm)?;

        tracing::debug!(
            realm = %realm,
            event = %context.event(),
            origin = %context.origin(),
            policy_count = policies.len(),
            "Evaluating client policies"
        );

        for policy in &policies {
            let decision = policy.evaluate(session, context, self.config.short_circuit)?;
            log_decision(realm, &decision);
            evaluation.decisions.push(decision);
        }

        Ok(evaluation)
    }

    /// Evaluate a single policy, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns the error raised while compiling or evaluating the policy.
    pub fn evaluate_policy(
        &self,
        policy: &ClientPolicyRepresentation,
        session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<PolicyDecision> {
        let decision = policy
            .compile(&self.registry)?
            .evaluate(session, context, self.config.short_circuit)?;
        log_decision(session.realm(), &decision);
        Ok(decision)
    }
}

impl std::fmt::Debug for ClientPolicyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPolicyManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn log_decision(realm: &str, decision: &PolicyDecision) {
    match decision.vote {
        Vote::Yes => tracing::info!(
            realm = %realm,
            policy_name = %decision.policy_name,
            executors = decision.executors.len(),
            "Client policy applies"
        ),
        Vote::No => tracing::debug!(
            realm = %realm,
            policy_name = %decision.policy_name,
            "Client policy does not apply"
        ),
        Vote::Abstain => tracing::trace!(
            realm = %realm,
            policy_name = %decision.policy_name,
            "Client policy abstained"
        ),
    }
}
