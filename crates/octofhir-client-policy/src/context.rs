//! Client policy evaluation context.
//!
//! A [`ClientPolicyContext`] describes one client-lifecycle event: what
//! happened ([`ClientPolicyEvent`]), through which channel
//! ([`ContextOrigin`]), and who triggered it. It is built once per request,
//! read by every condition, and never persisted.
//!
//! # Usage
//!
//! ```ignore
//! use octofhir_client_policy::context::ClientPolicyContext;
//!
//! // Dynamic client registration with an initial access token
//! let context = ClientPolicyContext::dynamic_register(token, representation);
//!
//! // Administrative update by a logged-in administrator
//! let context = ClientPolicyContext::builder(ClientPolicyEvent::Update)
//!     .admin_console()
//!     .with_authenticated_user(admin)
//!     .with_target_client(client)
//!     .build();
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::User;
use crate::types::{ClientRepresentation, ConnectionInfo, RealmClient, RegistrationToken};

// =============================================================================
// Client Policy Event
// =============================================================================

/// Client-lifecycle and protocol events client policies react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientPolicyEvent {
    /// A client is about to be registered.
    Register,
    /// A client has been registered.
    Registered,
    /// A client is about to be updated.
    Update,
    /// A client has been updated.
    Updated,
    /// A client registration is being read.
    View,
    /// A client is about to be removed.
    Unregister,
    /// An authorization endpoint request.
    AuthorizationRequest,
    /// A token endpoint request (code exchange).
    TokenRequest,
    /// A refresh token grant.
    TokenRefresh,
    /// A token revocation request.
    TokenRevoke,
    /// A token introspection request.
    TokenIntrospect,
    /// A userinfo endpoint request.
    UserinfoRequest,
    /// A logout request.
    LogoutRequest,
}

impl ClientPolicyEvent {
    /// All events, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Register,
        Self::Registered,
        Self::Update,
        Self::Updated,
        Self::View,
        Self::Unregister,
        Self::AuthorizationRequest,
        Self::TokenRequest,
        Self::TokenRefresh,
        Self::TokenRevoke,
        Self::TokenIntrospect,
        Self::UserinfoRequest,
        Self::LogoutRequest,
    ];

    /// Returns the wire name of the event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "REGISTER",
            Self::Registered => "REGISTERED",
            Self::Update => "UPDATE",
            Self::Updated => "UPDATED",
            Self::View => "VIEW",
            Self::Unregister => "UNREGISTER",
            Self::AuthorizationRequest => "AUTHORIZATION_REQUEST",
            Self::TokenRequest => "TOKEN_REQUEST",
            Self::TokenRefresh => "TOKEN_REFRESH",
            Self::TokenRevoke => "TOKEN_REVOKE",
            Self::TokenIntrospect => "TOKEN_INTROSPECT",
            Self::UserinfoRequest => "USERINFO_REQUEST",
            Self::LogoutRequest => "LOGOUT_REQUEST",
        }
    }

    /// Returns `true` for `REGISTER` and `UPDATE`.
    #[must_use]
    pub fn is_register_or_update(&self) -> bool {
        matches!(self, Self::Register | Self::Update)
    }
}

impl fmt::Display for ClientPolicyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientPolicyEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown client policy event: {}", s))
    }
}

// =============================================================================
// Context Origin
// =============================================================================

/// Channel through which the event was triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextOrigin {
    /// Realm administration (console or admin REST API).
    AdminConsole,
    /// OpenID Connect dynamic client registration.
    DynamicRegistration,
    /// An OAuth/OIDC protocol endpoint.
    #[default]
    Protocol,
}

impl fmt::Display for ContextOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminConsole => write!(f, "admin-console"),
            Self::DynamicRegistration => write!(f, "dynamic-registration"),
            Self::Protocol => write!(f, "protocol"),
        }
    }
}

// =============================================================================
// Client Policy Context
// =============================================================================

/// Everything conditions may inspect about one event.
///
/// Construction performs no I/O and no validation; a condition that cannot
/// interpret a context reports it when evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPolicyContext {
    event: ClientPolicyEvent,

    #[serde(default)]
    origin: ContextOrigin,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<RegistrationToken>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    authenticated_user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    authenticated_client: Option<RealmClient>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    representation: Option<ClientRepresentation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_client: Option<RealmClient>,

    #[serde(default)]
    connection: ConnectionInfo,
}

impl ClientPolicyContext {
    /// Start building a context for the given event.
    #[must_use]
    pub fn builder(event: ClientPolicyEvent) -> ClientPolicyContextBuilder {
        ClientPolicyContextBuilder::new(event)
    }

    /// Registration through realm administration.
    #[must_use]
    pub fn admin_register(
        user: Option<User>,
        client: Option<RealmClient>,
        representation: ClientRepresentation,
    ) -> Self {
        Self::builder(ClientPolicyEvent::Register)
            .admin_console()
            .with_principal(user, client)
            .with_representation(representation)
            .build()
    }

    /// Update of `target` through realm administration.
    #[must_use]
    pub fn admin_update(
        user: Option<User>,
        client: Option<RealmClient>,
        representation: ClientRepresentation,
        target: RealmClient,
    ) -> Self {
        Self::builder(ClientPolicyEvent::Update)
            .admin_console()
            .with_principal(user, client)
            .with_representation(representation)
            .with_target_client(target)
            .build()
    }

    /// Registration through dynamic client registration.
    #[must_use]
    pub fn dynamic_register(
        token: Option<RegistrationToken>,
        representation: ClientRepresentation,
    ) -> Self {
        Self::builder(ClientPolicyEvent::Register)
            .dynamic_registration()
            .with_optional_token(token)
            .with_representation(representation)
            .build()
    }

    /// Update of `target` through dynamic client registration.
    #[must_use]
    pub fn dynamic_update(
        token: Option<RegistrationToken>,
        representation: ClientRepresentation,
        target: RealmClient,
    ) -> Self {
        Self::builder(ClientPolicyEvent::Update)
            .dynamic_registration()
            .with_optional_token(token)
            .with_representation(representation)
            .with_target_client(target)
            .build()
    }

    /// A protocol event raised on behalf of `client`.
    #[must_use]
    pub fn protocol(event: ClientPolicyEvent, client: RealmClient) -> Self {
        Self::builder(event).with_target_client(client).build()
    }

    /// The event being evaluated.
    #[must_use]
    pub fn event(&self) -> ClientPolicyEvent {
        self.event
    }

    /// The channel the event came through.
    #[must_use]
    pub fn origin(&self) -> ContextOrigin {
        self.origin
    }

    /// Token presented with the request, if any.
    #[must_use]
    pub fn token(&self) -> Option<&RegistrationToken> {
        self.token.as_ref()
    }

    /// Logged-in user performing the action, if any.
    #[must_use]
    pub fn authenticated_user(&self) -> Option<&User> {
        self.authenticated_user.as_ref()
    }

    /// Authenticated client performing the action, if any.
    #[must_use]
    pub fn authenticated_client(&self) -> Option<&RealmClient> {
        self.authenticated_client.as_ref()
    }

    /// Client metadata submitted with a register/update.
    #[must_use]
    pub fn representation(&self) -> Option<&ClientRepresentation> {
        self.representation.as_ref()
    }

    /// The stored client the event concerns.
    #[must_use]
    pub fn target_client(&self) -> Option<&RealmClient> {
        self.target_client.as_ref()
    }

    /// Network origin of the request.
    #[must_use]
    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }
}

// =============================================================================
// Client Policy Context Builder
// =============================================================================

/// Builder for [`ClientPolicyContext`].
#[derive(Debug, Clone)]
pub struct ClientPolicyContextBuilder {
    context: ClientPolicyContext,
}

impl ClientPolicyContextBuilder {
    /// Create a builder for a protocol-originated event.
    #[must_use]
    pub fn new(event: ClientPolicyEvent) -> Self {
        Self {
            context: ClientPolicyContext {
                event,
                origin: ContextOrigin::Protocol,
                token: None,
                authenticated_user: None,
                authenticated_client: None,
                representation: None,
                target_client: None,
                connection: ConnectionInfo::default(),
            },
        }
    }

    /// Set the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: ContextOrigin) -> Self {
        self.context.origin = origin;
        self
    }

    /// Mark the event as coming from realm administration.
    #[must_use]
    pub fn admin_console(self) -> Self {
        self.with_origin(ContextOrigin::AdminConsole)
    }

    /// Mark the event as coming from dynamic client registration.
    #[must_use]
    pub fn dynamic_registration(self) -> Self {
        self.with_origin(ContextOrigin::DynamicRegistration)
    }

    #[must_use]
    pub fn with_token(mut self, token: RegistrationToken) -> Self {
        self.context.token = Some(token);
        self
    }

    #[must_use]
    pub fn with_optional_token(mut self, token: Option<RegistrationToken>) -> Self {
        self.context.token = token;
        self
    }

    #[must_use]
    pub fn with_authenticated_user(mut self, user: User) -> Self {
        self.context.authenticated_user = Some(user);
        self
    }

    #[must_use]
    pub fn with_authenticated_client(mut self, client: RealmClient) -> Self {
        self.context.authenticated_client = Some(client);
        self
    }

    /// Set whichever of user and client performed the action.
    #[must_use]
    pub fn with_principal(mut self, user: Option<User>, client: Option<RealmClient>) -> Self {
        self.context.authenticated_user = user;
        self.context.authenticated_client = client;
        self
    }

    #[must_use]
    pub fn with_representation(mut self, representation: ClientRepresentation) -> Self {
        self.context.representation = Some(representation);
        self
    }

    #[must_use]
    pub fn with_target_client(mut self, client: RealmClient) -> Self {
        self.context.target_client = Some(client);
        self
    }

    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.context.connection = connection;
        self
    }

    /// Build the context.
    #[must_use]
    pub fn build(self) -> ClientPolicyContext {
        self.context
    }
}

// =============================================================================
// Tests
// =============================================================================
