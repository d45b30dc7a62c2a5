//! Create payloads the collector can merge, and the responses it fans out.

use std::fmt;

use serde::Serialize;

use crate::api::{
    DedicatedServer, DedicatedServerCreateInput, DedicatedServerHostInput, SbmServer,
    SbmServerCreateInput, SbmServerHostInput,
};

/// Resource kind a create request belongs to. Requests of different kinds
/// never share a batch.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ResourceKind {
    /// Dedicated servers (`serverscom_dedicated_server`).
    Dedicated,
    /// Scalable bare metal servers (`serverscom_sbm_server`).
    Sbm,
}

impl ResourceKind {
    /// Returns the tag used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dedicated => "dedicated",
            Self::Sbm => "sbm",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access to the host list of a create payload.
///
/// Everything except the host list is shared configuration, so two payloads
/// that differ only in their hosts can be merged into one upstream call.
pub trait HostMerge: Clone + Serialize {
    /// Host entry type of the payload.
    type Host: Clone;

    /// Hosts declared by the payload, in order.
    fn hosts(&self) -> &[Self::Host];

    /// Replaces the host list.
    fn set_hosts(&mut self, hosts: Vec<Self::Host>);

    /// Hostname carried by a host entry.
    fn hostname(host: &Self::Host) -> &str;
}

impl HostMerge for DedicatedServerCreateInput {
    type Host = DedicatedServerHostInput;

    fn hosts(&self) -> &[Self::Host] {
        &self.hosts
    }

    fn set_hosts(&mut self, hosts: Vec<Self::Host>) {
        self.hosts = hosts;
    }

    fn hostname(host: &Self::Host) -> &str {
        &host.hostname
    }
}

impl HostMerge for SbmServerCreateInput {
    type Host = SbmServerHostInput;

    fn hosts(&self) -> &[Self::Host] {
        &self.hosts
    }

    fn set_hosts(&mut self, hosts: Vec<Self::Host>) {
        self.hosts = hosts;
    }

    fn hostname(host: &Self::Host) -> &str {
        &host.hostname
    }
}

/// Create payload accepted by the collector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CreateInput {
    /// Dedicated server order.
    Dedicated(DedicatedServerCreateInput),
    /// SBM server order.
    Sbm(SbmServerCreateInput),
}

impl CreateInput {
    /// Resource kind implied by the payload shape.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Dedicated(_) => ResourceKind::Dedicated,
            Self::Sbm(_) => ResourceKind::Sbm,
        }
    }

    /// Hostnames declared by the payload, in order.
    #[must_use]
    pub fn hostnames(&self) -> Vec<&str> {
        match self {
            Self::Dedicated(input) => input
                .hosts()
                .iter()
                .map(DedicatedServerCreateInput::hostname)
                .collect(),
            Self::Sbm(input) => input
                .hosts()
                .iter()
                .map(SbmServerCreateInput::hostname)
                .collect(),
        }
    }

    /// Number of hosts declared by the payload.
    #[must_use]
    pub fn host_count(&self) -> usize {
        match self {
            Self::Dedicated(input) => input.hosts.len(),
            Self::Sbm(input) => input.hosts.len(),
        }
    }

    pub(crate) const fn as_dedicated(&self) -> Option<&DedicatedServerCreateInput> {
        match self {
            Self::Dedicated(input) => Some(input),
            Self::Sbm(_) => None,
        }
    }

    pub(crate) const fn as_sbm(&self) -> Option<&SbmServerCreateInput> {
        match self {
            Self::Sbm(input) => Some(input),
            Self::Dedicated(_) => None,
        }
    }
}

impl From<DedicatedServerCreateInput> for CreateInput {
    fn from(value: DedicatedServerCreateInput) -> Self {
        Self::Dedicated(value)
    }
}

impl From<SbmServerCreateInput> for CreateInput {
    fn from(value: SbmServerCreateInput) -> Self {
        Self::Sbm(value)
    }
}

/// Servers created by one upstream batch call, shared by every request
/// merged into it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CreatedServers {
    /// Dedicated servers returned by the API.
    Dedicated(Vec<DedicatedServer>),
    /// SBM servers returned by the API.
    Sbm(Vec<SbmServer>),
}

impl CreatedServers {
    /// Returns the id of the server whose title matches `hostname`.
    #[must_use]
    pub fn id_by_hostname(&self, hostname: &str) -> Option<&str> {
        match self {
            Self::Dedicated(servers) => servers
                .iter()
                .find(|server| server.title == hostname)
                .map(|server| server.id.as_str()),
            Self::Sbm(servers) => servers
                .iter()
                .find(|server| server.title == hostname)
                .map(|server| server.id.as_str()),
        }
    }

    /// Number of servers in the response.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Dedicated(servers) => servers.len(),
            Self::Sbm(servers) => servers.len(),
        }
    }

    /// Whether the response holds no servers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Resource kind of the response.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Dedicated(_) => ResourceKind::Dedicated,
            Self::Sbm(_) => ResourceKind::Sbm,
        }
    }
}
