//! Client policy representations.
//!
//! A client policy is authored as a [`ClientPolicyRepresentation`]: a name,
//! an ordered list of condition components, and an ordered list of executor
//! references. At evaluation time it is compiled into a
//! [`ClientPolicy`](super::ClientPolicy) holding live condition providers.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_client_policy::policy::ClientPolicyRepresentation;
//!
//! let policy = ClientPolicyRepresentation::new("dcr-trusted-hosts")
//!     .with_condition(ComponentModel::new(
//!         "clientupdatesourcehost-condition",
//!         ComponentConfig::new().with("trusted-hosts", ["10.0.0.0/8"]),
//!     ))
//!     .with_executor(ExecutorReference::new("secure-client-authenticator"));
//!
//! policy.validate(&registry)?;
//! let compiled = policy.compile(&registry)?;
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ClientPolicy;
use crate::ClientPolicyResult;
use crate::component::{ComponentConfig, ComponentModel};
use crate::condition::ConditionRegistry;
use crate::error::ClientPolicyError;

// =============================================================================
// Client Policy Representation
// =============================================================================

/// An authored client policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPolicyRepresentation {
    /// Realm-unique policy name.
    pub name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Disabled policies are never evaluated.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Conditions, polled in order.
    #[serde(default)]
    pub conditions: Vec<ComponentModel>,

    /// Executors to run when the policy applies, in order.
    #[serde(default)]
    pub executors: Vec<ExecutorReference>,
}

fn default_enabled() -> bool {
    true
}

impl ClientPolicyRepresentation {
    /// Create an enabled policy with no conditions or executors.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            conditions: Vec::new(),
            executors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: ComponentModel) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn with_executor(mut self, executor: ExecutorReference) -> Self {
        self.executors.push(executor);
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Validate the policy at authoring time.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is blank or a condition
    /// configuration is invalid, and `UnknownProvider` if a condition refers
    /// to an unregistered provider.
    pub fn validate(&self, registry: &ConditionRegistry) -> ClientPolicyResult<()> {
        if self.name.trim().is_empty() {
            return Err(ClientPolicyError::configuration(
                "client policy name must not be empty",
            ));
        }

        for condition in &self.conditions {
            registry.validate(condition).map_err(|e| match e {
                ClientPolicyError::Configuration { message } => {
                    ClientPolicyError::configuration(format!(
                        "policy '{}', condition '{}': {}",
                        self.name,
                        condition.display_name(),
                        message
                    ))
                }
                other => other,
            })?;
        }

        Ok(())
    }

    /// Build the evaluable policy.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` if a condition refers to an unregistered
    /// provider, or the error raised while building a condition.
    pub fn compile(&self, registry: &ConditionRegistry) -> ClientPolicyResult<ClientPolicy> {
        let conditions = self
            .conditions
            .iter()
            .map(|component| {
                registry
                    .create(component)
                    .map(|condition| (component.display_name().to_string(), condition))
            })
            .collect::<ClientPolicyResult<Vec<_>>>()?;

        Ok(ClientPolicy::new(
            self.name.clone(),
            self.enabled,
            conditions,
            self.executors.clone(),
        ))
    }
}

// =============================================================================
// Executor Reference
// =============================================================================

/// Reference to an executor run when a policy applies.
///
/// Executors are opaque here; the reference is only carried through to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorReference {
    /// Executor provider ID.
    pub provider_id: String,

    /// Executor configuration.
    #[serde(default, skip_serializing_if = "ComponentConfig::is_empty")]
    pub config: ComponentConfig,
}

impl ExecutorReference {
    #[must_use]
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            config: ComponentConfig::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ComponentConfig) -> Self {
        self.config = config;
        self
    }
}

// =============================================================================
// Client Policy Set
// =============================================================================

/// The client policies of one realm, in authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPolicySet {
    #[serde(default)]
    pub policies: Vec<ClientPolicyRepresentation>,
}

impl ClientPolicySet {
    #[must_use]
    pub fn new(policies: Vec<ClientPolicyRepresentation>) -> Self {
        Self { policies }
    }

    /// Validate every policy and the uniqueness of their names.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePolicy` for the first repeated name, otherwise the
    /// first policy validation error.
    pub fn validate(&self, registry: &ConditionRegistry) -> ClientPolicyResult<()> {
        let mut seen = HashSet::new();
        for policy in &self.policies {
            if !seen.insert(policy.name.as_str()) {
                return Err(ClientPolicyError::duplicate_policy(&policy.name));
            }
        }

        self.policies
            .iter()
            .try_for_each(|policy| policy.validate(registry))
    }

    /// Look up a policy by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClientPolicyRepresentation> {
        self.policies.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
