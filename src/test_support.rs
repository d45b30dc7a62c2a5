//! Test support utilities shared across unit and integration tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use uuid::Uuid;

use crate::api::{
    ApiError, ApiFuture, DedicatedServer, DedicatedServerCreateInput, DedicatedServerHostInput,
    SbmServer, SbmServerCreateInput, SbmServerHostInput, ServerCreator,
};
use crate::collector::{CreateInput, ResourceKind};

/// Records a single batch create call made through [`RecordingCreator`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedCall {
    /// Merged payload the collector dispatched.
    pub payload: CreateInput,
    /// Tokio clock reading when the call was made.
    pub at: Instant,
}

impl RecordedCall {
    /// Resource kind of the call.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.payload.kind()
    }

    /// Hostnames of the merged payload, in order.
    #[must_use]
    pub fn hostnames(&self) -> Vec<String> {
        self.payload
            .hostnames()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<RecordedCall>,
    failure: Option<ApiError>,
    omitted: BTreeSet<String>,
}

/// Scripted [`ServerCreator`] that records every call and answers with one
/// server per requested host, titled by its hostname and carrying a random
/// id.
///
/// Clones share their recording, so a test can keep one handle while the
/// collector owns another.
#[derive(Clone, Debug, Default)]
pub struct RecordingCreator {
    script: Arc<Mutex<Script>>,
}

impl RecordingCreator {
    /// Creates a creator that succeeds for every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every later call fail with `error`.
    pub fn fail_with(&self, error: ApiError) {
        self.script().failure = Some(error);
    }

    /// Restores successful responses.
    pub fn clear_failure(&self) {
        self.script().failure = None;
    }

    /// Leaves `hostname` out of later responses, as if the API had dropped it.
    pub fn omit_hostname(&self, hostname: impl Into<String>) {
        self.script().omitted.insert(hostname.into());
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }

    /// Records `payload` and returns the hostnames to answer with, or the
    /// scripted failure.
    fn record(&self, payload: CreateInput) -> Result<Vec<String>, ApiError> {
        let mut script = self.script();
        let hostnames: Vec<String> = payload
            .hostnames()
            .into_iter()
            .filter(|hostname| !script.omitted.contains(*hostname))
            .map(str::to_owned)
            .collect();
        script.calls.push(RecordedCall {
            payload,
            at: Instant::now(),
        });
        match &script.failure {
            Some(error) => Err(error.clone()),
            None => Ok(hostnames),
        }
    }
}

impl ServerCreator for RecordingCreator {
    fn create_dedicated_servers<'a>(
        &'a self,
        input: &'a DedicatedServerCreateInput,
    ) -> ApiFuture<'a, Vec<DedicatedServer>> {
        Box::pin(async move {
            let hostnames = self.record(CreateInput::Dedicated(input.clone()))?;
            Ok(hostnames
                .into_iter()
                .map(|hostname| dedicated_server(hostname, input.location_id))
                .collect())
        })
    }

    fn create_sbm_servers<'a>(
        &'a self,
        input: &'a SbmServerCreateInput,
    ) -> ApiFuture<'a, Vec<SbmServer>> {
        Box::pin(async move {
            let hostnames = self.record(CreateInput::Sbm(input.clone()))?;
            Ok(hostnames
                .into_iter()
                .map(|hostname| sbm_server(hostname, input.location_id))
                .collect())
        })
    }
}

/// Builds a freshly ordered dedicated server record with a random id.
#[must_use]
pub fn dedicated_server(hostname: impl Into<String>, location_id: i64) -> DedicatedServer {
    DedicatedServer {
        id: Uuid::new_v4().simple().to_string(),
        title: hostname.into(),
        location_id,
        status: String::from("init"),
        configuration: String::from("dedicated"),
        ..DedicatedServer::default()
    }
}

/// Builds a freshly ordered SBM server record with a random id.
#[must_use]
pub fn sbm_server(hostname: impl Into<String>, location_id: i64) -> SbmServer {
    SbmServer {
        id: Uuid::new_v4().simple().to_string(),
        title: hostname.into(),
        location_id,
        status: String::from("init"),
        configuration: String::from("sbm"),
        ..SbmServer::default()
    }
}

/// Dedicated server payload with a fixed configuration and the given hosts.
#[must_use]
pub fn dedicated_input(hostnames: &[&str]) -> DedicatedServerCreateInput {
    DedicatedServerCreateInput {
        server_model_id: 101,
        location_id: 1,
        ram_size: 32,
        operating_system_id: Some(49),
        hosts: hostnames
            .iter()
            .map(|hostname| DedicatedServerHostInput::new(*hostname))
            .collect(),
        ..DedicatedServerCreateInput::default()
    }
}

/// SBM server payload with a fixed configuration and the given hosts.
#[must_use]
pub fn sbm_input(hostnames: &[&str]) -> SbmServerCreateInput {
    SbmServerCreateInput {
        flavor_model_id: 7,
        location_id: 1,
        operating_system_id: Some(49),
        hosts: hostnames
            .iter()
            .map(|hostname| SbmServerHostInput::new(*hostname))
            .collect(),
        ..SbmServerCreateInput::default()
    }
}
