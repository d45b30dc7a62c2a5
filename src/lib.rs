//! Batch collector for servers.com server orders.
//!
//! Many independent create handlers each ask for one dedicated or SBM
//! server. The [`collector`] holds those requests for a short debounce
//! window, merges the ones that share a configuration into a single
//! `POST /hosts/...` call, and hands the shared response back to every
//! caller. [`provision`] wraps the round trip for a single server, and
//! [`api`] talks to the servers.com public API.

pub mod api;
pub mod collector;
pub mod config;
pub mod provision;
pub mod test_support;

pub use api::{ApiError, ApiFuture, ServerCreator, ServerscomClient};
pub use collector::{
    BatchReceiver, BatchResult, CollectorError, CreateInput, CreatedServers, HostMerge,
    ResourceKind, ServerCollector,
};
pub use config::{ConfigError, ServerscomConfig};
pub use provision::{ProvisionError, Provisioner};
