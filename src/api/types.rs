//! Request and response payloads exchanged with the servers.com hosts API.
//!
//! Field order is part of the contract: the collector hashes the JSON
//! rendering of a create payload, so fields serialise in declaration order.

use serde::{Deserialize, Serialize};

/// Partition entry of a drive layout.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerLayoutPartitionInput {
    /// Mount point or `swap`.
    pub target: String,
    /// Partition size in megabytes.
    pub size: u64,
    /// Filesystem to format the partition with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<String>,
    /// Whether the partition takes the remaining space.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fill: bool,
}

/// Drive layout spanning one or more slots.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerLayoutInput {
    /// Slot positions covered by this layout.
    pub slot_positions: Vec<u32>,
    /// RAID level applied across the slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid: Option<u32>,
    /// Partitions created on the resulting volume.
    pub partitions: Vec<DedicatedServerLayoutPartitionInput>,
}

/// Drive slot selection.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerSlotInput {
    /// Physical slot position.
    pub position: u32,
    /// Drive model installed in the slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_model_id: Option<i64>,
}

/// Drive configuration of a dedicated server.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerDrivesInput {
    /// Slot assignments.
    pub slots: Vec<DedicatedServerSlotInput>,
    /// Layouts built on top of the slots.
    pub layout: Vec<DedicatedServerLayoutInput>,
}

/// Public uplink selection.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerPublicUplinkInput {
    /// Uplink model identifier.
    pub id: i64,
    /// Bandwidth plan identifier.
    pub bandwidth_model_id: i64,
}

/// Private uplink selection.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerPrivateUplinkInput {
    /// Uplink model identifier.
    pub id: i64,
}

/// Uplinks requested for a dedicated server.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerUplinkModelsInput {
    /// Optional public uplink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<DedicatedServerPublicUplinkInput>,
    /// Mandatory private uplink.
    pub private: DedicatedServerPrivateUplinkInput,
}

/// One host to create as part of a dedicated server order.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerHostInput {
    /// Hostname, reported back as the server title.
    pub hostname: String,
    /// Network pool used for the public IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ipv4_network_id: Option<String>,
    /// Network pool used for the private IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ipv4_network_id: Option<String>,
}

impl DedicatedServerHostInput {
    /// Creates a host entry with no explicit network pools.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }
}

/// Payload of `POST /hosts/dedicated_servers`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServerCreateInput {
    /// Server model identifier.
    pub server_model_id: i64,
    /// Location identifier.
    pub location_id: i64,
    /// RAM size in gigabytes.
    pub ram_size: u32,
    /// Uplink selection.
    pub uplink_models: DedicatedServerUplinkModelsInput,
    /// Drive selection and layout.
    pub drives: DedicatedServerDrivesInput,
    /// Optional feature flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    /// Whether to allocate IPv6 addresses.
    pub ipv6: bool,
    /// Hosts to create; every other field is shared by all of them.
    pub hosts: Vec<DedicatedServerHostInput>,
    /// Operating system to install.
    pub operating_system_id: Option<i64>,
    /// SSH keys installed for the root user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_key_fingerprints: Vec<String>,
    /// Cloud-init user data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// One host to create as part of an SBM server order.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SbmServerHostInput {
    /// Hostname, reported back as the server title.
    pub hostname: String,
    /// Network pool used for the public IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ipv4_network_id: Option<String>,
    /// Network pool used for the private IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ipv4_network_id: Option<String>,
}

impl SbmServerHostInput {
    /// Creates a host entry with no explicit network pools.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }
}

/// Payload of `POST /hosts/sbm_servers`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SbmServerCreateInput {
    /// SBM flavor identifier.
    pub flavor_model_id: i64,
    /// Location identifier.
    pub location_id: i64,
    /// Hosts to create; every other field is shared by all of them.
    pub hosts: Vec<SbmServerHostInput>,
    /// Operating system to install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system_id: Option<i64>,
    /// SSH keys installed for the root user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_key_fingerprints: Vec<String>,
    /// Cloud-init user data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

/// Dedicated server record returned by the API.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DedicatedServer {
    /// Server identifier.
    pub id: String,
    /// Title; equals the requested hostname right after creation.
    pub title: String,
    /// Location identifier.
    #[serde(default)]
    pub location_id: i64,
    /// Location code such as `AMS1`.
    #[serde(default)]
    pub location_code: String,
    /// Provisioning status (`init`, `pending`, `active`, ...).
    #[serde(default)]
    pub status: String,
    /// Human readable configuration summary.
    #[serde(default)]
    pub configuration: String,
    /// Private IPv4 address once assigned.
    #[serde(default)]
    pub private_ipv4_address: Option<String>,
    /// Public IPv4 address once assigned.
    #[serde(default)]
    pub public_ipv4_address: Option<String>,
}

/// SBM server record returned by the API.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SbmServer {
    /// Server identifier.
    pub id: String,
    /// Title; equals the requested hostname right after creation.
    pub title: String,
    /// Location identifier.
    #[serde(default)]
    pub location_id: i64,
    /// Location code such as `AMS1`.
    #[serde(default)]
    pub location_code: String,
    /// Provisioning status (`init`, `pending`, `active`, ...).
    #[serde(default)]
    pub status: String,
    /// Human readable configuration summary.
    #[serde(default)]
    pub configuration: String,
    /// Private IPv4 address once assigned.
    #[serde(default)]
    pub private_ipv4_address: Option<String>,
    /// Public IPv4 address once assigned.
    #[serde(default)]
    pub public_ipv4_address: Option<String>,
}

/// Error body returned by the API for 4xx and 5xx responses.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) message: String,
}
