//! Merging one group of pending requests into a single upstream call.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiError, ServerCreator};

use super::BatchResult;
use super::checksum::short;
use super::error::CollectorError;
use super::input::{CreateInput, CreatedServers, HostMerge, ResourceKind};
use super::table::BatchGroup;

/// Combined payload of a group plus the per-request duplicate rejections,
/// aligned with the group's enqueue order.
#[derive(Debug)]
pub(crate) struct Merged<I> {
    pub(crate) payload: I,
    pub(crate) rejections: Vec<Option<CollectorError>>,
}

/// Concatenates the host lists of `inputs` in order. A host entry whose
/// hostname was already claimed earlier in the group is skipped and its
/// request is marked with the first duplicate it hit; the request's other
/// entries still join the batch. The first payload supplies the shared
/// configuration.
pub(crate) fn merge_hosts<I: HostMerge>(inputs: &[&I]) -> Result<Merged<I>, CollectorError> {
    let Some(first) = inputs.first() else {
        return Err(CollectorError::EmptyBatch);
    };

    let mut claimed: HashSet<&str> = HashSet::new();
    let mut hosts = Vec::new();
    let mut rejections = Vec::with_capacity(inputs.len());

    for input in inputs {
        let mut rejection = None;
        for host in input.hosts() {
            let hostname = I::hostname(host);
            if !claimed.insert(hostname) {
                warn!(hostname, "skipping duplicate hostname");
                if rejection.is_none() {
                    rejection = Some(CollectorError::DuplicateHostname {
                        hostname: hostname.to_owned(),
                    });
                }
                continue;
            }
            hosts.push(host.clone());
        }
        rejections.push(rejection);
    }

    let mut payload = (*first).clone();
    payload.set_hosts(hosts);
    Ok(Merged {
        payload,
        rejections,
    })
}

fn typed<'a, I>(
    kind: ResourceKind,
    inputs: &'a [CreateInput],
    pick: fn(&CreateInput) -> Option<&I>,
) -> Result<Vec<&'a I>, CollectorError> {
    inputs
        .iter()
        .map(|input| {
            pick(input).ok_or(CollectorError::UnexpectedInput {
                expected: kind,
                found: input.kind(),
            })
        })
        .collect()
}

/// Merges a group whose payloads must all match `kind`.
///
/// # Errors
///
/// Returns [`CollectorError::UnexpectedInput`] when a payload of another kind
/// was queued under `kind`, and [`CollectorError::EmptyBatch`] for an empty
/// group. Either fails the whole group.
pub(crate) fn merge_group(
    kind: ResourceKind,
    inputs: &[CreateInput],
) -> Result<Merged<CreateInput>, CollectorError> {
    match kind {
        ResourceKind::Dedicated => {
            let merged = merge_hosts(&typed(kind, inputs, CreateInput::as_dedicated)?)?;
            Ok(Merged {
                payload: CreateInput::Dedicated(merged.payload),
                rejections: merged.rejections,
            })
        }
        ResourceKind::Sbm => {
            let merged = merge_hosts(&typed(kind, inputs, CreateInput::as_sbm)?)?;
            Ok(Merged {
                payload: CreateInput::Sbm(merged.payload),
                rejections: merged.rejections,
            })
        }
    }
}

async fn dispatch<C>(creator: &C, payload: &CreateInput) -> Result<CreatedServers, ApiError>
where
    C: ServerCreator + ?Sized,
{
    match payload {
        CreateInput::Dedicated(input) => creator
            .create_dedicated_servers(input)
            .await
            .map(CreatedServers::Dedicated),
        CreateInput::Sbm(input) => creator
            .create_sbm_servers(input)
            .await
            .map(CreatedServers::Sbm),
    }
}

/// Creates every host of `group` with one upstream call and delivers exactly
/// one result to every request of the group. Requests that declared a
/// duplicate hostname receive their own error; all others share the call's
/// outcome.
pub(crate) async fn create_batch<C>(creator: &C, group: BatchGroup)
where
    C: ServerCreator + ?Sized,
{
    let BatchGroup {
        kind,
        checksum,
        requests,
    } = group;
    let (inputs, senders): (Vec<_>, Vec<_>) = requests
        .into_iter()
        .map(|request| (request.input, request.sender))
        .unzip();

    let merged = match merge_group(kind, &inputs) {
        Ok(merged) => merged,
        Err(err) => {
            warn!(%kind, checksum = short(&checksum), error = %err, "discarding batch");
            for sender in senders {
                if sender.send(Err(err.clone())).is_err() {
                    debug!(%kind, "caller stopped waiting for batch result");
                }
            }
            return;
        }
    };

    let host_count = merged.payload.host_count();
    let result: BatchResult = if host_count == 0 {
        Err(CollectorError::EmptyBatch)
    } else {
        info!(
            %kind,
            checksum = short(&checksum),
            hosts = host_count,
            requests = senders.len(),
            "dispatching batch create"
        );
        dispatch(creator, &merged.payload)
            .await
            .map(Arc::new)
            .map_err(|err| {
                warn!(%kind, checksum = short(&checksum), error = %err, "batch create failed");
                CollectorError::from(err)
            })
    };

    for (sender, rejection) in senders.into_iter().zip(merged.rejections) {
        let delivered = rejection.map_or_else(|| result.clone(), Err);
        if sender.send(delivered).is_err() {
            debug!(%kind, "caller stopped waiting for batch result");
        }
    }
}
