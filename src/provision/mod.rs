//! Caller side of the collector: submit one server, wait for its batch, and
//! pick the created id out of the shared response.

use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::api::{DedicatedServerCreateInput, SbmServerCreateInput, ServerCreator};
use crate::collector::{CollectorError, CreateInput, ResourceKind, ServerCollector};

/// Errors raised while provisioning a single server through the collector.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProvisionError {
    /// Raised when the payload does not describe exactly one named host.
    #[error("invalid create request: {0}")]
    Validation(String),
    /// Raised when the collector or the batch reports a failure.
    #[error(transparent)]
    Collector(#[from] CollectorError),
    /// Raised when the batch result does not arrive in time.
    #[error("timed out after {waited:?} waiting for the batch creating {hostname}")]
    Timeout {
        /// Hostname of the request.
        hostname: String,
        /// How long the caller waited.
        waited: Duration,
    },
    /// Raised when the API returned no servers.
    #[error("invalid {kind} servers count returned by api")]
    EmptyResponse {
        /// Resource kind of the batch.
        kind: ResourceKind,
    },
    /// Raised when no returned server carries the requested hostname.
    #[error("can't find the server with title '{hostname}' in api response")]
    HostnameNotFound {
        /// Hostname of the request.
        hostname: String,
    },
}

/// Provisions servers one at a time on behalf of independent callers, letting
/// the collector merge concurrent calls into batches.
pub struct Provisioner<C> {
    collector: ServerCollector<C>,
    wait_timeout: Option<Duration>,
}

impl<C> Clone for Provisioner<C> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            wait_timeout: self.wait_timeout,
        }
    }
}

impl<C> Provisioner<C>
where
    C: ServerCreator + Send + Sync + 'static,
{
    /// Creates a provisioner that waits for batch results indefinitely.
    #[must_use]
    pub const fn new(collector: ServerCollector<C>) -> Self {
        Self {
            collector,
            wait_timeout: None,
        }
    }

    /// Bounds how long each call waits for its batch result.
    #[must_use]
    pub const fn with_wait_timeout(mut self, limit: Duration) -> Self {
        self.wait_timeout = Some(limit);
        self
    }

    /// Collector the provisioner submits to.
    #[must_use]
    pub const fn collector(&self) -> &ServerCollector<C> {
        &self.collector
    }

    /// Creates one dedicated server and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when the payload is invalid, the batch
    /// fails, the wait times out, or the response lacks the hostname.
    pub async fn create_dedicated_server(
        &self,
        input: DedicatedServerCreateInput,
    ) -> Result<String, ProvisionError> {
        self.submit(ResourceKind::Dedicated, CreateInput::Dedicated(input))
            .await
    }

    /// Creates one SBM server and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when the payload is invalid, the batch
    /// fails, the wait times out, or the response lacks the hostname.
    pub async fn create_sbm_server(
        &self,
        input: SbmServerCreateInput,
    ) -> Result<String, ProvisionError> {
        self.submit(ResourceKind::Sbm, CreateInput::Sbm(input)).await
    }

    async fn submit(&self, kind: ResourceKind, input: CreateInput) -> Result<String, ProvisionError> {
        let hostname = single_hostname(&input)?;
        let receiver = self.collector.add_request(kind, input)?;

        let outcome = match self.wait_timeout {
            Some(limit) => timeout(limit, receiver.recv())
                .await
                .map_err(|_| ProvisionError::Timeout {
                    hostname: hostname.clone(),
                    waited: limit,
                })?,
            None => receiver.recv().await,
        };
        let servers = outcome?;

        if servers.is_empty() {
            return Err(ProvisionError::EmptyResponse { kind });
        }

        let id = servers
            .id_by_hostname(&hostname)
            .ok_or_else(|| ProvisionError::HostnameNotFound {
                hostname: hostname.clone(),
            })?;
        debug!(%kind, %hostname, id, "server created");
        Ok(id.to_owned())
    }
}

fn single_hostname(input: &CreateInput) -> Result<String, ProvisionError> {
    match input.hostnames().as_slice() {
        [hostname] if !hostname.trim().is_empty() => Ok((*hostname).to_owned()),
        [_] => Err(ProvisionError::Validation(String::from(
            "hostname must not be empty",
        ))),
        hosts => Err(ProvisionError::Validation(format!(
            "expected exactly one host, got {}",
            hosts.len()
        ))),
    }
}
