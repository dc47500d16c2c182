//! Common types shared by contexts, conditions and storage.
//!
//! ## Domain Types
//!
//! - [`RealmClient`] - A client registered in a realm
//! - [`ClientRepresentation`] - Client metadata being registered or updated
//! - [`RegistrationToken`] - Validated token presented by the caller
//! - [`ConnectionInfo`] - Network origin of the request

pub mod client;
pub mod connection;
pub mod token;

pub use client::{ClientRepresentation, RealmClient};
pub use connection::ConnectionInfo;
pub use token::RegistrationToken;
