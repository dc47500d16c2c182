//! Network origin of a request.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Where the request came from.
///
/// The caller fills in the reverse-resolved hostname if it has one; the
/// policy core never performs DNS lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Remote peer address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<IpAddr>,

    /// Reverse-resolved remote hostname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_host: Option<String>,
}

impl ConnectionInfo {
    /// Connection known only by address.
    #[must_use]
    pub fn from_addr(addr: IpAddr) -> Self {
        Self {
            remote_addr: Some(addr),
            remote_host: None,
        }
    }

    /// Set the reverse-resolved hostname.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = Some(host.into());
        self
    }
}
