//! Upstream boundary of the collector: the servers.com hosts API.
//!
//! The collector only needs the two batch create calls, expressed by the
//! [`ServerCreator`] trait. [`ServerscomClient`] implements it over HTTPS;
//! tests substitute [`crate::test_support::RecordingCreator`].

mod client;
mod error;
mod types;

use std::future::Future;
use std::pin::Pin;

pub use client::ServerscomClient;
pub use error::ApiError;
pub use types::{
    DedicatedServer, DedicatedServerCreateInput, DedicatedServerDrivesInput,
    DedicatedServerHostInput, DedicatedServerLayoutInput, DedicatedServerLayoutPartitionInput,
    DedicatedServerPrivateUplinkInput, DedicatedServerPublicUplinkInput,
    DedicatedServerSlotInput, DedicatedServerUplinkModelsInput, SbmServer, SbmServerCreateInput,
    SbmServerHostInput,
};

/// Future returned by upstream API operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Batch create operations the collector dispatches upstream.
pub trait ServerCreator {
    /// Creates every host listed in `input` with the shared configuration.
    fn create_dedicated_servers<'a>(
        &'a self,
        input: &'a DedicatedServerCreateInput,
    ) -> ApiFuture<'a, Vec<DedicatedServer>>;

    /// Creates every SBM host listed in `input` with the shared configuration.
    fn create_sbm_servers<'a>(
        &'a self,
        input: &'a SbmServerCreateInput,
    ) -> ApiFuture<'a, Vec<SbmServer>>;
}
