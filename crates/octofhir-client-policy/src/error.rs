//! Client policy error types.
//!
//! This module defines the errors that can occur while authoring or
//! evaluating client policies. Business rejections are not errors here: a
//! condition that disqualifies a policy votes [`Vote::No`](crate::Vote::No).

use std::fmt;

/// OAuth 2.0 `server_error` code.
pub const SERVER_ERROR: &str = "server_error";

/// RFC 7591 `invalid_client_metadata` code.
pub const INVALID_CLIENT_METADATA: &str = "invalid_client_metadata";

/// Errors that can occur during client policy authoring and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ClientPolicyError {
    /// A condition was invoked with a context it cannot interpret.
    ///
    /// This is a contract violation between the caller and the condition,
    /// never a business outcome, and must not be downgraded to a `NO` vote.
    #[error("Condition error ({error}): {detail}")]
    Condition {
        /// OAuth-style error code (normally `server_error`).
        error: String,
        /// Description of the violation.
        detail: String,
    },

    /// A component or policy configuration failed validation.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A policy references a condition provider that is not registered.
    #[error("Unknown condition provider: {provider_id}")]
    UnknownProvider {
        /// The unregistered provider ID.
        provider_id: String,
    },

    /// Two policies of the same realm share a name.
    #[error("Duplicate client policy name: {name}")]
    DuplicatePolicy {
        /// The duplicated policy name.
        name: String,
    },

    /// A data-access collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },
}

impl ClientPolicyError {
    /// Creates a new `Condition` error (a `ConditionError`).
    #[must_use]
    pub fn condition(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Condition {
            error: error.into(),
            detail: detail.into(),
        }
    }

    /// Creates a `Condition` error with the `server_error` code.
    #[must_use]
    pub fn unexpected_context(detail: impl Into<String>) -> Self {
        Self::condition(SERVER_ERROR, detail)
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `UnknownProvider` error.
    #[must_use]
    pub fn unknown_provider(provider_id: impl Into<String>) -> Self {
        Self::UnknownProvider {
            provider_id: provider_id.into(),
        }
    }

    /// Creates a new `DuplicatePolicy` error.
    #[must_use]
    pub fn duplicate_policy(name: impl Into<String>) -> Self {
        Self::DuplicatePolicy { name: name.into() }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` if the error should surface as an internal/server error.
    ///
    /// A `Condition` error is server-class only when it carries the
    /// `server_error` code.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Condition { error, .. } => error == SERVER_ERROR,
            Self::UnknownProvider { .. } | Self::Storage { .. } => true,
            Self::Configuration { .. } | Self::DuplicatePolicy { .. } => false,
        }
    }

    /// Returns `true` if the error was raised at policy-authoring time.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::DuplicatePolicy { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Condition { .. } => ErrorCategory::Contract,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::UnknownProvider { .. } => ErrorCategory::Configuration,
            Self::DuplicatePolicy { .. } => ErrorCategory::Configuration,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &str {
        match self {
            Self::Condition { error, .. } => error,
            Self::Configuration { .. } => "invalid_request",
            Self::UnknownProvider { .. } => SERVER_ERROR,
            Self::DuplicatePolicy { .. } => "invalid_request",
            Self::Storage { .. } => SERVER_ERROR,
        }
    }
}

/// Categories of client policy errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A condition and its caller disagree about the context shape.
    Contract,
    /// Policy or component configuration errors.
    Configuration,
    /// Data-access failures.
    Infrastructure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract => write!(f, "contract"),
            Self::Configuration => write!(f, "configuration"),
            Self::Infrastructure => write!(f, "infrastructure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientPolicyError::unexpected_context("unexpected context type.");
        assert_eq!(
            err.to_string(),
            "Condition error (server_error): unexpected context type."
        );

        let err = ClientPolicyError::unknown_provider("made-up-condition");
        assert_eq!(
            err.to_string(),
            "Unknown condition provider: made-up-condition"
        );

        let err = ClientPolicyError::storage("connection reset");
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }

    #[test]
    fn test_error_predicates() {
        let err = ClientPolicyError::unexpected_context("test");
        assert!(err.is_server_error());
        assert!(!err.is_configuration_error());

        let err = ClientPolicyError::configuration("bad boolean");
        assert!(!err.is_server_error());
        assert!(err.is_configuration_error());

        let err = ClientPolicyError::duplicate_policy("p1");
        assert!(err.is_configuration_error());

        let err = ClientPolicyError::storage("database down");
        assert!(err.is_server_error());

        let err = ClientPolicyError::condition(INVALID_CLIENT_METADATA, "bad redirect URI");
        assert!(!err.is_server_error());
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ClientPolicyError::unexpected_context("test").category(),
            ErrorCategory::Contract
        );
        assert_eq!(
            ClientPolicyError::configuration("test").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            ClientPolicyError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            ClientPolicyError::unexpected_context("test").oauth_error_code(),
            "server_error"
        );
        assert_eq!(
            ClientPolicyError::condition(INVALID_CLIENT_METADATA, "test").oauth_error_code(),
            "invalid_client_metadata"
        );
        assert_eq!(
            ClientPolicyError::configuration("test").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            ClientPolicyError::storage("test").oauth_error_code(),
            "server_error"
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Contract.to_string(), "contract");
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
