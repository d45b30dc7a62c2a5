//! Pending requests grouped by resource kind and checksum.

use std::collections::HashMap;
use std::mem;

use tokio::sync::oneshot;

use super::BatchResult;
use super::input::{CreateInput, ResourceKind};

/// A queued create request and the slot its result is delivered to.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    pub(crate) input: CreateInput,
    pub(crate) sender: oneshot::Sender<BatchResult>,
}

/// All requests sharing one resource kind and checksum, in enqueue order.
#[derive(Debug)]
pub(crate) struct BatchGroup {
    pub(crate) kind: ResourceKind,
    pub(crate) checksum: String,
    pub(crate) requests: Vec<PendingRequest>,
}

/// Two-level map from resource kind to checksum to queued requests.
#[derive(Debug, Default)]
pub(crate) struct AggregationTable {
    groups: HashMap<ResourceKind, HashMap<String, Vec<PendingRequest>>>,
}

impl AggregationTable {
    pub(crate) fn push(&mut self, kind: ResourceKind, checksum: String, request: PendingRequest) {
        self.groups
            .entry(kind)
            .or_default()
            .entry(checksum)
            .or_default()
            .push(request);
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.groups
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }

    /// Removes every non-empty group, ordered by kind then checksum. A request
    /// leaves the table exactly once, so no two flushes can see it.
    pub(crate) fn drain(&mut self) -> Vec<BatchGroup> {
        let mut drained: Vec<BatchGroup> = mem::take(&mut self.groups)
            .into_iter()
            .flat_map(|(kind, by_checksum)| {
                by_checksum
                    .into_iter()
                    .filter(|(_, requests)| !requests.is_empty())
                    .map(move |(checksum, requests)| BatchGroup {
                        kind,
                        checksum,
                        requests,
                    })
            })
            .collect();
        drained.sort_by(|lhs, rhs| {
            lhs.kind
                .cmp(&rhs.kind)
                .then_with(|| lhs.checksum.cmp(&rhs.checksum))
        });
        drained
    }
}
