/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod support;

use async_trait::async_trait;
use bus_topology::{
    Batcher, DispatchConsistency, DispatchError, OutgoingBatchRouter, OutgoingMessage,
    OversizedMessageHandler, OversizedMessageOutcome, ReceiveSettings, RejectOversizedMessages,
    RetryPolicy, TopologyCreator, TopologyOperator, TopologyResourcesCreator,
    TopologySectionManager, WireMessage,
};
use in_memory_broker::{init_logging, InMemoryBroker};
use std::sync::Arc;
use std::time::Duration;
use support::{bindings, sections_for, single_namespace_registry, RecordingHandler, wait_until, CONNECTION};

async fn provisioned_sections(broker: &InMemoryBroker) -> Arc<TopologySectionManager> {
    let registry = single_namespace_registry();
    let sections = sections_for(&registry);

    TopologyResourcesCreator::new(
        TopologyCreator::new(
            Arc::new(broker.clone()),
            RetryPolicy::new(3, Duration::from_millis(1)),
        ),
        sections.clone(),
        registry,
        bindings(&[], &["audit"]),
        "sales-endpoint",
    )
    .create_if_necessary()
    .await
    .unwrap();

    sections
}

#[tokio::test]
async fn routed_operations_reach_the_broker_in_order() {
    init_logging();
    let broker = InMemoryBroker::new();
    let sections = provisioned_sections(&broker).await;

    let batcher = Batcher::new(sections);
    let router = OutgoingBatchRouter::new(
        Arc::new(broker.clone()),
        Arc::new(RejectOversizedMessages),
    );

    router
        .route_batches(
            batcher.batch(vec![
                OutgoingMessage::new("m-1", "audit", b"first".to_vec()),
                OutgoingMessage::new("m-2", "audit", b"second".to_vec()),
            ]),
            None,
            DispatchConsistency::Isolated,
        )
        .await
        .unwrap();

    let sent = broker.sent(CONNECTION);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].message_id, "m-1");
    assert_eq!(sent[1].message_id, "m-2");
    assert!(sent.iter().all(|message| message.path == "audit"));
}

#[tokio::test]
async fn dispatched_messages_are_received_by_the_pump() {
    let broker = InMemoryBroker::new();
    let sections = provisioned_sections(&broker).await;
    let section = sections
        .determine_queues_to_create(&bindings(&[], &["audit"]), "sales-endpoint")
        .await;

    let operator = TopologyOperator::new(
        Arc::new(broker.clone()),
        ReceiveSettings {
            clients_per_entity: 1,
            ..ReceiveSettings::default()
        },
    );
    let handler = RecordingHandler::new();
    operator.on_incoming_message(handler.clone());
    operator.start(&section, 2).await.unwrap();

    let batcher = Batcher::new(sections);
    let router = OutgoingBatchRouter::new(
        Arc::new(broker.clone()),
        Arc::new(RejectOversizedMessages),
    );
    router
        .route_batches(
            batcher.batch(vec![OutgoingMessage::new(
                "loopback",
                "sales-endpoint",
                b"hello".to_vec(),
            )]),
            None,
            DispatchConsistency::Isolated,
        )
        .await
        .unwrap();

    wait_until(
        || {
            handler
                .seen
                .try_lock()
                .map(|seen| !seen.is_empty())
                .unwrap_or(false)
        },
        "the dispatched message to arrive",
    )
    .await;

    assert_eq!(handler.message_ids().await, vec!["loopback".to_string()]);

    operator.stop().await;
}

struct StubOversized;

#[async_trait]
impl OversizedMessageHandler for StubOversized {
    async fn handle(&self, message: WireMessage, _limit: usize) -> OversizedMessageOutcome {
        // Claim-check style: replace the payload with a small stub.
        OversizedMessageOutcome::Dispatch(WireMessage {
            body: b"offloaded".to_vec(),
            ..message
        })
    }
}

#[tokio::test]
async fn oversized_payloads_follow_the_handler_outcome() {
    let broker = InMemoryBroker::new();
    broker.set_message_size_limit(64);
    let sections = provisioned_sections(&broker).await;
    let batcher = Batcher::new(sections);

    let rejecting = OutgoingBatchRouter::new(
        Arc::new(broker.clone()),
        Arc::new(RejectOversizedMessages),
    );
    let result = rejecting
        .route_batches(
            batcher.batch(vec![OutgoingMessage::new("big", "audit", vec![0u8; 256])]),
            None,
            DispatchConsistency::Isolated,
        )
        .await;
    assert!(matches!(
        result,
        Err(DispatchError::OversizedRejected { .. })
    ));
    assert!(broker.sent(CONNECTION).is_empty());

    let offloading = OutgoingBatchRouter::new(
        Arc::new(broker.clone()),
        Arc::new(StubOversized),
    );
    offloading
        .route_batches(
            batcher.batch(vec![OutgoingMessage::new("big", "audit", vec![0u8; 256])]),
            None,
            DispatchConsistency::Isolated,
        )
        .await
        .unwrap();

    let sent = broker.sent(CONNECTION);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, b"offloaded");
}
