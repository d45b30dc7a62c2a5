//! Error types for the server collector.

use thiserror::Error;

use crate::api::ApiError;

use super::input::ResourceKind;

/// Errors delivered by the collector, either synchronously from
/// [`super::ServerCollector::add_request`] or through a batch result.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CollectorError {
    /// Raised when a create payload cannot be serialised for grouping.
    #[error("failed to compute request checksum: {message}")]
    Checksum {
        /// Serialiser error message.
        message: String,
    },
    /// Raised for a request whose hostname was already claimed by an earlier
    /// request of the same batch.
    #[error("duplicate hostname found: {hostname}")]
    DuplicateHostname {
        /// Hostname that appeared more than once.
        hostname: String,
    },
    /// Raised when a queued payload does not match the resource kind of its
    /// group.
    #[error("unexpected {found} create input in a {expected} batch")]
    UnexpectedInput {
        /// Resource kind the group was queued under.
        expected: ResourceKind,
        /// Resource kind of the offending payload.
        found: ResourceKind,
    },
    /// Raised when a batch has no hosts left to create.
    #[error("batch contains no hosts to create")]
    EmptyBatch,
    /// Raised when the upstream create call fails; shared by every request
    /// merged into the call.
    #[error("upstream create failed: {0}")]
    Api(#[from] ApiError),
    /// Raised when a result channel closes without a delivery.
    #[error("batch was abandoned before a result was delivered")]
    Abandoned,
    /// Raised when requests are submitted after shutdown.
    #[error("server collector has been shut down")]
    ShutDown,
}
