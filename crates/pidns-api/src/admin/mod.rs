// Admin API client
//
// One client type for every appliance service. Transport mechanics live in
// `client`; each endpoint group adds inherent methods from its own file.

pub mod blocklists;
pub mod client;
pub mod lists;
pub mod models;
pub mod network;
pub mod statistics;

pub use blocklists::UpdateAllReply;
pub use client::AdminClient;
pub use lists::ListKind;
pub use network::LeaseRefresh;
