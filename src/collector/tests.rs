//! Unit tests for grouping, merging, and batch delivery.

use rstest::rstest;
use tokio::sync::oneshot;

use super::batch::{create_batch, merge_group, merge_hosts};
use super::table::{AggregationTable, BatchGroup, PendingRequest};
use super::*;
use crate::api::{ApiError, SbmServerHostInput};
use crate::test_support::{RecordingCreator, dedicated_input, sbm_input};

fn pending(input: impl Into<CreateInput>) -> (PendingRequest, oneshot::Receiver<BatchResult>) {
    let (sender, receiver) = oneshot::channel();
    (
        PendingRequest {
            input: input.into(),
            sender,
        },
        receiver,
    )
}

fn group_of(
    kind: ResourceKind,
    inputs: Vec<CreateInput>,
) -> (BatchGroup, Vec<oneshot::Receiver<BatchResult>>) {
    let (requests, receivers) = inputs.into_iter().map(pending).unzip();
    (
        BatchGroup {
            kind,
            checksum: String::from("0123456789abcdef"),
            requests,
        },
        receivers,
    )
}

#[test]
fn checksum_ignores_hosts() {
    let first = checksum(&dedicated_input(&["node-1"])).expect("checksum");
    let second = checksum(&dedicated_input(&["node-2", "node-3"])).expect("checksum");
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn checksum_tracks_shared_configuration() {
    let base = dedicated_input(&["node-1"]);
    let mut other = base.clone();
    other.ram_size = 64;
    assert_ne!(
        checksum(&base).expect("checksum"),
        checksum(&other).expect("checksum")
    );
}

#[test]
fn checksum_leaves_input_untouched() {
    let input = sbm_input(&["node-1", "node-2"]);
    let before = input.clone();
    checksum(&input).expect("checksum");
    assert_eq!(input, before);
}

#[test]
fn checksum_is_stable_across_calls() {
    let input = CreateInput::from(sbm_input(&["node-1"]));
    assert_eq!(
        input.checksum().expect("checksum"),
        input.checksum().expect("checksum")
    );
}

#[test]
fn checksum_ignores_host_network_pools() {
    let plain = sbm_input(&["node-1"]);
    let mut pooled = plain.clone();
    pooled.hosts = vec![SbmServerHostInput {
        hostname: String::from("node-9"),
        public_ipv4_network_id: Some(String::from("net-1")),
        private_ipv4_network_id: None,
    }];
    assert_eq!(
        checksum(&plain).expect("checksum"),
        checksum(&pooled).expect("checksum")
    );
}

#[test]
fn merge_concatenates_hosts_in_order() {
    let a = sbm_input(&["a-1", "a-2"]);
    let b = sbm_input(&["b-1"]);
    let merged = merge_hosts(&[&a, &b]).expect("merge");
    let names: Vec<&str> = merged
        .payload
        .hosts
        .iter()
        .map(|host| host.hostname.as_str())
        .collect();
    assert_eq!(names, ["a-1", "a-2", "b-1"]);
    assert_eq!(merged.rejections, vec![None, None]);
    assert_eq!(merged.payload.flavor_model_id, a.flavor_model_id);
}

#[test]
fn merge_skips_only_the_colliding_host() {
    let a = dedicated_input(&["node-1"]);
    let b = dedicated_input(&["node-1", "node-2"]);
    let c = dedicated_input(&["node-3"]);
    let merged = merge_hosts(&[&a, &b, &c]).expect("merge");
    let names: Vec<&str> = merged
        .payload
        .hosts
        .iter()
        .map(|host| host.hostname.as_str())
        .collect();
    assert_eq!(names, ["node-1", "node-2", "node-3"]);
    assert_eq!(
        merged.rejections,
        vec![
            None,
            Some(CollectorError::DuplicateHostname {
                hostname: String::from("node-1"),
            }),
            None,
        ]
    );
}

#[test]
fn merge_reports_first_duplicate_of_a_request() {
    let a = sbm_input(&["a-1", "a-2"]);
    let b = sbm_input(&["a-2", "b-1", "a-1"]);
    let merged = merge_hosts(&[&a, &b]).expect("merge");
    let names: Vec<&str> = merged
        .payload
        .hosts
        .iter()
        .map(|host| host.hostname.as_str())
        .collect();
    assert_eq!(names, ["a-1", "a-2", "b-1"]);
    assert_eq!(
        merged.rejections.get(1),
        Some(&Some(CollectorError::DuplicateHostname {
            hostname: String::from("a-2"),
        }))
    );
}

#[test]
fn merge_rejects_duplicate_within_one_request() {
    let a = dedicated_input(&["twin", "twin"]);
    let b = dedicated_input(&["twin"]);
    let merged = merge_hosts(&[&a, &b]).expect("merge");
    assert_eq!(merged.payload.hosts.len(), 1);
    let twin = Some(CollectorError::DuplicateHostname {
        hostname: String::from("twin"),
    });
    assert_eq!(merged.rejections, vec![twin.clone(), twin]);
}

#[test]
fn merge_of_nothing_is_empty_batch() {
    let inputs: [&crate::api::SbmServerCreateInput; 0] = [];
    assert!(matches!(
        merge_hosts(&inputs),
        Err(CollectorError::EmptyBatch)
    ));
}

#[rstest]
#[case(ResourceKind::Dedicated, CreateInput::from(sbm_input(&["x"])), ResourceKind::Sbm)]
#[case(ResourceKind::Sbm, CreateInput::from(dedicated_input(&["x"])), ResourceKind::Dedicated)]
fn merge_group_rejects_mismatched_kind(
    #[case] kind: ResourceKind,
    #[case] stray: CreateInput,
    #[case] found: ResourceKind,
) {
    let matching = match kind {
        ResourceKind::Dedicated => CreateInput::from(dedicated_input(&["ok"])),
        ResourceKind::Sbm => CreateInput::from(sbm_input(&["ok"])),
    };
    let err = merge_group(kind, &[matching, stray]).expect_err("mismatch");
    assert_eq!(
        err,
        CollectorError::UnexpectedInput {
            expected: kind,
            found,
        }
    );
}

#[test]
fn table_drain_removes_every_group() {
    let mut table = AggregationTable::default();
    let dedicated = CreateInput::from(dedicated_input(&["d-1"]));
    let sbm = CreateInput::from(sbm_input(&["s-1"]));
    let mut keep = Vec::new();
    for (kind, input) in [
        (ResourceKind::Sbm, sbm.clone()),
        (ResourceKind::Dedicated, dedicated.clone()),
        (ResourceKind::Dedicated, dedicated.clone()),
    ] {
        let key = input.checksum().expect("checksum");
        let (request, receiver) = pending(input);
        keep.push(receiver);
        table.push(kind, key, request);
    }
    assert_eq!(table.pending_count(), 3);

    let groups = table.drain();
    assert!(table.is_empty());
    assert!(table.drain().is_empty());
    let shape: Vec<(ResourceKind, usize)> = groups
        .iter()
        .map(|group| (group.kind, group.requests.len()))
        .collect();
    assert_eq!(shape, [(ResourceKind::Dedicated, 2), (ResourceKind::Sbm, 1)]);
}

#[tokio::test]
async fn create_batch_shares_one_response() {
    let creator = RecordingCreator::new();
    let (group, receivers) = group_of(
        ResourceKind::Dedicated,
        vec![
            dedicated_input(&["node-1"]).into(),
            dedicated_input(&["node-2"]).into(),
        ],
    );

    create_batch(&creator, group).await;

    assert_eq!(creator.call_count(), 1);
    let mut results = Vec::new();
    for receiver in receivers {
        results.push(receiver.await.expect("delivered").expect("created"));
    }
    let [first, second] = results.as_slice() else {
        panic!("expected two results");
    };
    assert!(Arc::ptr_eq(first, second));
    assert_eq!(first.count(), 2);
    assert!(first.id_by_hostname("node-2").is_some());
}

#[tokio::test]
async fn create_batch_fans_out_upstream_error() {
    let creator = RecordingCreator::new();
    let failure = ApiError::Conflict {
        code: String::from("CONFLICT"),
        message: String::from("quota exceeded"),
    };
    creator.fail_with(failure.clone());
    let (group, receivers) = group_of(
        ResourceKind::Sbm,
        vec![sbm_input(&["a"]).into(), sbm_input(&["b"]).into()],
    );

    create_batch(&creator, group).await;

    for receiver in receivers {
        let err = receiver.await.expect("delivered").expect_err("failed");
        assert_eq!(err, CollectorError::Api(failure.clone()));
    }
}

#[tokio::test]
async fn create_batch_skips_call_when_no_hosts_remain() {
    let creator = RecordingCreator::new();
    let (group, receivers) = group_of(
        ResourceKind::Sbm,
        vec![sbm_input(&[]).into(), sbm_input(&[]).into()],
    );

    create_batch(&creator, group).await;

    assert_eq!(creator.call_count(), 0);
    for receiver in receivers {
        assert_eq!(
            receiver.await.expect("delivered"),
            Err(CollectorError::EmptyBatch)
        );
    }
}

#[tokio::test]
async fn create_batch_fails_whole_group_on_kind_mismatch() {
    let creator = RecordingCreator::new();
    let (group, receivers) = group_of(
        ResourceKind::Sbm,
        vec![sbm_input(&["a"]).into(), dedicated_input(&["b"]).into()],
    );

    create_batch(&creator, group).await;

    assert_eq!(creator.call_count(), 0);
    for receiver in receivers {
        assert!(matches!(
            receiver.await.expect("delivered"),
            Err(CollectorError::UnexpectedInput { .. })
        ));
    }
}

#[tokio::test]
async fn create_batch_tolerates_dropped_receiver() {
    let creator = RecordingCreator::new();
    let (group, mut receivers) = group_of(
        ResourceKind::Dedicated,
        vec![
            dedicated_input(&["gone"]).into(),
            dedicated_input(&["kept"]).into(),
        ],
    );
    drop(receivers.remove(0));

    create_batch(&creator, group).await;

    let kept = receivers.remove(0).await.expect("delivered").expect("created");
    assert!(kept.id_by_hostname("kept").is_some());
}

#[tokio::test]
async fn receiver_reports_abandoned_batch() {
    let (request, receiver) = pending(dedicated_input(&["lost"]));
    drop(request);
    let receiver = BatchReceiver { receiver };
    assert_eq!(receiver.recv().await, Err(CollectorError::Abandoned));
}
