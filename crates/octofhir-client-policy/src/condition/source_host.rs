//! Source-host condition.
//!
//! Votes `YES` when a client registration or update comes from a trusted
//! host. Trusted host entries may be:
//!
//! - an IP address (`10.0.0.7`, `::1`)
//! - a CIDR block (`192.168.0.0/16`)
//! - an exact hostname (`build.example.org`)
//! - a domain wildcard (`*.example.org`, matching any subdomain)
//!
//! Addresses are matched against the remote address of the request,
//! hostnames against the remote hostname supplied by the caller.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnetwork::{IpNetwork, Ipv4Network};
use tracing::{debug, trace, warn};

use super::{ConditionProvider, ConditionProviderFactory, Vote};
use crate::ClientPolicyResult;
use crate::component::ComponentConfig;
use crate::context::ClientPolicyContext;
use crate::error::ClientPolicyError;
use crate::session::RealmSession;
use crate::types::ConnectionInfo;

/// Provider ID.
pub const PROVIDER_ID: &str = "clientupdatesourcehost-condition";

/// Option holding the trusted host entries.
pub const TRUSTED_HOSTS: &str = "trusted-hosts";

/// Option enabling host matching (default `true`).
pub const HOST_SENDING_REQUEST_MUST_MATCH: &str = "host-sending-request-must-match";

// =============================================================================
// Trusted Host
// =============================================================================

/// One parsed `trusted-hosts` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustedHost {
    /// An address or address block.
    Network(IpNetwork),
    /// An exact hostname, lowercase.
    Hostname(String),
    /// A parent domain; matches strict subdomains only. Lowercase.
    Domain(String),
}

impl TrustedHost {
    /// Returns `true` if the connection originates from this host.
    #[must_use]
    pub fn matches(&self, connection: &ConnectionInfo) -> bool {
        match self {
            Self::Network(network) => connection
                .remote_addr
                .is_some_and(|addr| network.contains(canonical(addr))),
            Self::Hostname(name) => connection
                .remote_host
                .as_deref()
                .is_some_and(|host| normalize_host(host) == *name),
            Self::Domain(domain) => connection.remote_host.as_deref().is_some_and(|host| {
                normalize_host(host)
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.len() > 1 && prefix.ends_with('.'))
            }),
        }
    }
}

impl FromStr for TrustedHost {
    type Err = ClientPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || {
            ClientPolicyError::configuration(format!("Malformed trusted host '{}'", raw))
        };

        if raw.is_empty() {
            return Err(invalid());
        }
        if let Ok(network) = raw.parse::<IpNetwork>() {
            return Ok(Self::Network(canonical_network(network)));
        }
        if let Some(domain) = raw.strip_prefix("*.") {
            let domain = normalize_host(domain);
            return if is_valid_hostname(&domain) {
                Ok(Self::Domain(domain))
            } else {
                Err(invalid())
            };
        }

        let name = normalize_host(raw);
        if is_valid_hostname(&name) {
            Ok(Self::Hostname(name))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for TrustedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(network) => write!(f, "{}", network),
            Self::Hostname(name) => write!(f, "{}", name),
            Self::Domain(domain) => write!(f, "*.{}", domain),
        }
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Map IPv4-mapped IPv6 addresses back to IPv4.
fn canonical(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
        IpAddr::V4(_) => addr,
    }
}

/// Rewrite an IPv4-mapped IPv6 block (`::ffff:a.b.c.d/n`, `n >= 96`) as the
/// IPv4 block it covers, so it compares against canonical addresses.
fn canonical_network(network: IpNetwork) -> IpNetwork {
    match network {
        IpNetwork::V6(v6) if v6.prefix() >= 96 => v6
            .ip()
            .to_ipv4_mapped()
            .and_then(|v4| Ipv4Network::new(v4, v6.prefix() - 96).ok())
            .map_or(network, IpNetwork::V4),
        _ => network,
    }
}

// =============================================================================
// Condition
// =============================================================================

/// Votes on the network origin of a register/update.
#[derive(Debug, Clone)]
pub struct SourceHostCondition {
    trusted_hosts: Vec<TrustedHost>,
    must_match: bool,
}

impl SourceHostCondition {
    /// Create a condition with host matching enabled.
    #[must_use]
    pub fn new(trusted_hosts: Vec<TrustedHost>) -> Self {
        Self {
            trusted_hosts,
            must_match: true,
        }
    }

    /// Build from configuration, skipping malformed host entries. A
    /// malformed matching flag keeps matching enabled.
    #[must_use]
    pub fn from_config(config: &ComponentConfig) -> Self {
        let must_match = config.get_bool_or_default(HOST_SENDING_REQUEST_MUST_MATCH, true);
        let trusted_hosts = config
            .get_list(TRUSTED_HOSTS)
            .iter()
            .filter_map(|raw| match raw.parse::<TrustedHost>() {
                Ok(host) => Some(host),
                Err(_) => {
                    warn!(host = %raw, "Ignoring malformed trusted host");
                    None
                }
            })
            .collect();

        Self {
            trusted_hosts,
            must_match,
        }
    }

    #[must_use]
    pub fn trusted_hosts(&self) -> &[TrustedHost] {
        &self.trusted_hosts
    }

    #[must_use]
    pub fn is_matching_enabled(&self) -> bool {
        self.must_match
    }
}

impl ConditionProvider for SourceHostCondition {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn evaluate(
        &self,
        _session: &RealmSession<'_>,
        context: &ClientPolicyContext,
    ) -> ClientPolicyResult<Vote> {
        if !context.event().is_register_or_update() || !self.must_match {
            return Ok(Vote::Abstain);
        }

        let connection = context.connection();
        trace!(
            remote_addr = ?connection.remote_addr,
            remote_host = ?connection.remote_host,
            "Checking request source host"
        );

        if connection.remote_addr.is_none() && connection.remote_host.is_none() {
            debug!("No remote address or hostname available");
            return Ok(Vote::No);
        }

        let matched = self.trusted_hosts.iter().find(|host| host.matches(connection));
        if let Some(host) = matched {
            trace!(trusted_host = %host, "Request source is trusted");
        }

        Ok(Vote::from_match(matched.is_some()))
    }
}

// =============================================================================
// Factory
// =============================================================================

/// Factory for [`SourceHostCondition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceHostConditionFactory;

impl ConditionProviderFactory for SourceHostConditionFactory {
    fn provider_id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn help_text(&self) -> &'static str {
        "The condition checks the host or address of the entity that tries to register or update a client."
    }

    fn create(&self, config: &ComponentConfig) -> ClientPolicyResult<Box<dyn ConditionProvider>> {
        Ok(Box::new(SourceHostCondition::from_config(config)))
    }

    fn validate_configuration(&self, config: &ComponentConfig) -> ClientPolicyResult<()> {
        if !config.get_bool(HOST_SENDING_REQUEST_MUST_MATCH, true)? {
            return Err(ClientPolicyError::configuration(
                "At least one of hosts verification must be enabled",
            ));
        }
        for raw in config.get_list(TRUSTED_HOSTS) {
            raw.parse::<TrustedHost>()?;
        }
        Ok(())
    }
}
