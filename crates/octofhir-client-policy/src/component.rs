//! Realm-owned component configuration.
//!
//! Every condition is configured through a [`ComponentConfig`]: a mapping
//! from option name to a list of string values. Scalar options are stored
//! as single-element lists and booleans as `"true"`/`"false"`.
//!
//! A missing option never is an error: it means no constraint was
//! configured, and each condition decides what that implies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ClientPolicyError;
use crate::ClientPolicyResult;

// =============================================================================
// Component Config
// =============================================================================

/// Multivalued option map of a configured component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentConfig(BTreeMap<String, Vec<String>>);

impl ComponentConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option to a list of values.
    #[must_use]
    pub fn with<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.put(name, values);
        self
    }

    /// Set an option to a single value.
    #[must_use]
    pub fn with_single(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, [value.into()])
    }

    /// Replace the values of an option.
    pub fn put<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(name.into(), values.into_iter().map(Into::into).collect());
    }

    /// Get the values of an option, or `None` if it is not configured.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Get the values of an option, treating a missing option as empty.
    #[must_use]
    pub fn get_list(&self, name: &str) -> &[String] {
        self.get(name).unwrap_or_default()
    }

    /// Get the first value of an option.
    #[must_use]
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Read a boolean option.
    ///
    /// A missing or blank option yields `default`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the value is not `true` or `false`
    /// (case-insensitive).
    pub fn get_bool(&self, name: &str, default: bool) -> ClientPolicyResult<bool> {
        let Some(raw) = self.get_first(name).map(str::trim) else {
            return Ok(default);
        };
        if raw.is_empty() {
            return Ok(default);
        }
        if raw.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ClientPolicyError::configuration(format!(
                "option '{}' must be a boolean, got '{}'",
                name, raw
            )))
        }
    }

    /// Read a boolean option, falling back to `default` when the value is
    /// malformed.
    ///
    /// Conditions are built with this so that one badly stored flag does not
    /// fail the evaluation of a whole realm; [`get_bool`](Self::get_bool)
    /// reports the value at validation time.
    #[must_use]
    pub fn get_bool_or_default(&self, name: &str, default: bool) -> bool {
        self.get_bool(name, default).unwrap_or_else(|e| {
            tracing::warn!(option = %name, error = %e, "Ignoring malformed boolean option");
            default
        })
    }

    /// Returns `true` if no option is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for ComponentConfig
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut config = Self::new();
        for (name, values) in iter {
            config.put(name, values);
        }
        config
    }
}

// =============================================================================
// Component Model
// =============================================================================

/// A persisted, configured component: which provider to build and with
/// which options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentModel {
    /// Registered provider ID (e.g. `clientupdatecontext-condition`).
    pub provider_id: String,

    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Provider options.
    #[serde(default)]
    pub config: ComponentConfig,
}

impl ComponentModel {
    /// Create a component for a provider with the given options.
    #[must_use]
    pub fn new(provider_id: impl Into<String>, config: ComponentConfig) -> Self {
        Self {
            provider_id: provider_id.into(),
            name: None,
            config,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name used in logs: the display name, falling back to the provider ID.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.provider_id)
    }
}
