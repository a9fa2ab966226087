// pidns-api: Async Rust client for the PiDNS admin and dashboard APIs

pub mod admin;
pub mod auth;
pub mod error;
pub mod transport;

pub use admin::models;
pub use admin::{AdminClient, LeaseRefresh, ListKind, UpdateAllReply};
pub use auth::Credentials;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
