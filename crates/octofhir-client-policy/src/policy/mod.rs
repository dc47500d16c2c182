//! Client policies and their evaluation.
//!
//! - [`model`] - authored policies ([`ClientPolicyRepresentation`]) and
//!   policy sets with authoring-time validation
//! - [`manager`] - compiled policies, vote aggregation and the realm-wide
//!   [`ClientPolicyManager`]
//!
//! ```ignore
//! use octofhir_client_policy::policy::{ClientPolicyManager, ClientPolicySet};
//!
//! let set = ClientPolicySet::new(storage.find_by_realm("master")?);
//! set.validate(&registry)?;
//!
//! let evaluation = manager.evaluate(&session, &context)?;
//! for decision in evaluation.matched_policies() {
//!     println!("{} applies", decision.policy_name);
//! }
//! ```

pub mod manager;
pub mod model;

pub use manager::{
    ClientPolicy, ClientPolicyManager, ConditionVote, PolicyDecision, RealmEvaluation, aggregate,
};
pub use model::{ClientPolicyRepresentation, ClientPolicySet, ExecutorReference};
