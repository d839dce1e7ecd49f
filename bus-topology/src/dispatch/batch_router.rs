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

//! Sends per-destination batches through cached namespace senders.

use crate::broker::{BrokerClientProvider, BrokerError, BrokerSender};
use crate::dispatch::batcher::Batch;
use crate::dispatch::oversized::{OversizedMessageHandler, OversizedMessageOutcome};
use crate::messages::{DispatchConsistency, ReceiveContext, WireMessage};
use crate::namespaces::NamespaceInfo;
use crate::observability::{events, fields};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "outgoing_batch_router";

/// Outbound dispatch failures.
#[derive(Debug)]
pub enum DispatchError {
    /// Receive-bound consistency was requested without a receive context.
    MissingReceiveContext,
    /// No sender could be opened for a destination namespace.
    SenderUnavailable { alias: String, source: BrokerError },
    SendFailed { path: String, source: BrokerError },
    /// An over-limit message was rejected by the oversized-message handler.
    OversizedRejected { message_id: String, reason: String },
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::MissingReceiveContext => {
                write!(f, "receive-bound dispatch requires a receive context")
            }
            DispatchError::SenderUnavailable { alias, source } => {
                write!(f, "no sender for namespace `{alias}`: {source}")
            }
            DispatchError::SendFailed { path, source } => {
                write!(f, "send to `{path}` failed: {source}")
            }
            DispatchError::OversizedRejected { message_id, reason } => {
                write!(f, "oversized message `{message_id}` rejected: {reason}")
            }
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::SenderUnavailable { source, .. }
            | DispatchError::SendFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

struct CachedSender {
    sender: Arc<dyn BrokerSender>,
    size_limit: usize,
}

/// Routes batches to their destination namespaces, delegating over-limit
/// payloads to the configured oversized-message handler instead of failing
/// the whole batch. Senders are opened once per namespace and reused.
pub struct OutgoingBatchRouter {
    clients: Arc<dyn BrokerClientProvider>,
    oversized: Arc<dyn OversizedMessageHandler>,
    senders: Mutex<HashMap<String, Arc<CachedSender>>>,
}

impl OutgoingBatchRouter {
    pub fn new(
        clients: Arc<dyn BrokerClientProvider>,
        oversized: Arc<dyn OversizedMessageHandler>,
    ) -> Self {
        Self {
            clients,
            oversized,
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Sends every batch in order. Batches sharing a namespace reuse one
    /// sender; a failed send aborts the remaining batches.
    pub async fn route_batches(
        &self,
        batches: Vec<Batch>,
        receive_context: Option<&ReceiveContext>,
        consistency: DispatchConsistency,
    ) -> Result<(), DispatchError> {
        if consistency == DispatchConsistency::ReceiveBound && receive_context.is_none() {
            return Err(DispatchError::MissingReceiveContext);
        }

        debug!(
            component = COMPONENT,
            consistency = ?consistency,
            triggered_by = %fields::format_optional(
                receive_context.map(|context| context.entity_path.as_str())
            ),
            "routing outgoing batches"
        );

        for batch in batches {
            let cached = self.sender_for(&batch.destination.namespace).await?;

            for operation in &batch.operations {
                let wire = WireMessage::from_outgoing(operation, &batch.destination.path);
                let wire = match self.fit_to_limit(wire, cached.size_limit).await? {
                    Some(wire) => wire,
                    None => continue,
                };

                let path = wire.path.clone();
                let message_id = wire.message_id.clone();
                cached.sender.send(wire).await.map_err(|source| {
                    warn!(
                        event = events::DISPATCH_SEND_FAILED,
                        component = COMPONENT,
                        path = path.as_str(),
                        message_id = message_id.as_str(),
                        err = %source,
                        "send failed"
                    );
                    DispatchError::SendFailed { path, source }
                })?;

                debug!(
                    event = events::DISPATCH_SEND_OK,
                    component = COMPONENT,
                    message_id = message_id.as_str(),
                    "message dispatched"
                );
            }
        }
        Ok(())
    }

    /// Returns the message to send, `None` when the handler chose to skip it.
    async fn fit_to_limit(
        &self,
        wire: WireMessage,
        size_limit: usize,
    ) -> Result<Option<WireMessage>, DispatchError> {
        if wire.encoded_len() <= size_limit {
            return Ok(Some(wire));
        }

        let message_id = wire.message_id.clone();
        match self.oversized.handle(wire, size_limit).await {
            OversizedMessageOutcome::Dispatch(substitute) => {
                if substitute.encoded_len() > size_limit {
                    return Err(DispatchError::OversizedRejected {
                        message_id,
                        reason: "substitute message still exceeds the broker limit".to_string(),
                    });
                }
                info!(
                    event = events::DISPATCH_OVERSIZED_DELEGATED,
                    component = COMPONENT,
                    message_id = message_id.as_str(),
                    "oversized message replaced by its handler's substitute"
                );
                Ok(Some(substitute))
            }
            OversizedMessageOutcome::Skip => {
                info!(
                    event = events::DISPATCH_OVERSIZED_SKIPPED,
                    component = COMPONENT,
                    message_id = message_id.as_str(),
                    "oversized message skipped by its handler"
                );
                Ok(None)
            }
            OversizedMessageOutcome::Reject { reason } => {
                warn!(
                    event = events::DISPATCH_OVERSIZED_REJECTED,
                    component = COMPONENT,
                    message_id = message_id.as_str(),
                    reason = reason.as_str(),
                    "oversized message rejected"
                );
                Err(DispatchError::OversizedRejected { message_id, reason })
            }
        }
    }

    async fn sender_for(
        &self,
        namespace: &NamespaceInfo,
    ) -> Result<Arc<CachedSender>, DispatchError> {
        let key = namespace.alias.to_ascii_lowercase();
        let mut senders = self.senders.lock().await;

        if let Some(cached) = senders.get(&key) {
            debug!(
                event = events::SENDER_REUSE,
                component = COMPONENT,
                namespace = key.as_str(),
                "reusing cached sender"
            );
            return Ok(cached.clone());
        }

        let client = self.clients.client_for(namespace).await.map_err(|source| {
            DispatchError::SenderUnavailable {
                alias: namespace.alias.clone(),
                source,
            }
        })?;
        let sender = client.open_sender().await.map_err(|source| {
            DispatchError::SenderUnavailable {
                alias: namespace.alias.clone(),
                source,
            }
        })?;

        let cached = Arc::new(CachedSender {
            sender,
            size_limit: client.message_size_limit(),
        });
        senders.insert(key.clone(), cached.clone());
        info!(
            event = events::SENDER_OPEN,
            component = COMPONENT,
            namespace = key.as_str(),
            "opened sender"
        );
        Ok(cached)
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatchError, OutgoingBatchRouter};
    use crate::broker::{
        BrokerClient, BrokerClientProvider, BrokerError, BrokerSender, EntityKind, ReceiveStream,
    };
    use crate::dispatch::batcher::Batch;
    use crate::dispatch::oversized::{
        OversizedMessageHandler, OversizedMessageOutcome, RejectOversizedMessages,
    };
    use crate::messages::{DispatchConsistency, OutgoingMessage, WireMessage};
    use crate::namespaces::{NamespaceInfo, NamespacePurpose};
    use crate::topology::entities::EntityInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct RecordingSender {
        sent: Mutex<Vec<WireMessage>>,
    }

    #[async_trait]
    impl BrokerSender for RecordingSender {
        async fn send(&self, message: WireMessage) -> Result<(), BrokerError> {
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    struct RecordingClient {
        sender: Arc<RecordingSender>,
        size_limit: usize,
        opened: AtomicUsize,
    }

    impl RecordingClient {
        fn with_limit(size_limit: usize) -> Arc<Self> {
            Arc::new(Self {
                sender: Arc::new(RecordingSender {
                    sent: Mutex::new(Vec::new()),
                }),
                size_limit,
                opened: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BrokerClient for RecordingClient {
        async fn create_entity(&self, _path: &str, _kind: EntityKind) -> Result<(), BrokerError> {
            Ok(())
        }

        async fn entity_exists(&self, _path: &str) -> Result<bool, BrokerError> {
            Ok(true)
        }

        async fn can_manage_entities(&self) -> Result<bool, BrokerError> {
            Ok(true)
        }

        async fn open_sender(&self) -> Result<Arc<dyn BrokerSender>, BrokerError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(self.sender.clone())
        }

        async fn open_receiver(
            &self,
            _path: &str,
            _kind: EntityKind,
        ) -> Result<Box<dyn ReceiveStream>, BrokerError> {
            Err(BrokerError::permanent("receivers not modeled"))
        }

        fn message_size_limit(&self) -> usize {
            self.size_limit
        }
    }

    struct FixedClientProvider {
        client: Arc<RecordingClient>,
    }

    #[async_trait]
    impl BrokerClientProvider for FixedClientProvider {
        async fn client_for(
            &self,
            _namespace: &NamespaceInfo,
        ) -> Result<Arc<dyn BrokerClient>, BrokerError> {
            Ok(self.client.clone())
        }
    }

    struct SkipOversized;

    #[async_trait]
    impl OversizedMessageHandler for SkipOversized {
        async fn handle(&self, _message: WireMessage, _limit: usize) -> OversizedMessageOutcome {
            OversizedMessageOutcome::Skip
        }
    }

    fn sending_namespace() -> NamespaceInfo {
        NamespaceInfo::new("send", "send-connection", NamespacePurpose::Sending)
    }

    fn batch(path: &str, operations: Vec<OutgoingMessage>) -> Batch {
        Batch {
            destination: EntityInfo::new(path, EntityKind::Queue, sending_namespace(), false),
            operations,
        }
    }

    #[tokio::test]
    async fn batches_share_one_sender_per_namespace() {
        let client = RecordingClient::with_limit(1024);
        let router = OutgoingBatchRouter::new(
            Arc::new(FixedClientProvider {
                client: client.clone(),
            }),
            Arc::new(RejectOversizedMessages),
        );

        router
            .route_batches(
                vec![
                    batch("orders", vec![OutgoingMessage::new("m-1", "orders", Vec::new())]),
                    batch("billing", vec![OutgoingMessage::new("m-2", "billing", Vec::new())]),
                ],
                None,
                DispatchConsistency::Isolated,
            )
            .await
            .unwrap();

        assert_eq!(client.opened.load(Ordering::SeqCst), 1);
        let sent = client.sender.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].path, "orders");
        assert_eq!(sent[1].path, "billing");
    }

    #[tokio::test]
    async fn receive_bound_dispatch_requires_a_context() {
        let client = RecordingClient::with_limit(1024);
        let router = OutgoingBatchRouter::new(
            Arc::new(FixedClientProvider { client }),
            Arc::new(RejectOversizedMessages),
        );

        let result = router
            .route_batches(
                vec![batch("orders", vec![OutgoingMessage::new("m-1", "orders", Vec::new())])],
                None,
                DispatchConsistency::ReceiveBound,
            )
            .await;

        assert!(matches!(result, Err(DispatchError::MissingReceiveContext)));
    }

    #[tokio::test]
    async fn skipped_oversized_message_does_not_fail_the_batch() {
        let client = RecordingClient::with_limit(32);
        let router = OutgoingBatchRouter::new(
            Arc::new(FixedClientProvider {
                client: client.clone(),
            }),
            Arc::new(SkipOversized),
        );

        router
            .route_batches(
                vec![batch(
                    "orders",
                    vec![
                        OutgoingMessage::new("big", "orders", vec![0u8; 128]),
                        OutgoingMessage::new("small", "orders", Vec::new()),
                    ],
                )],
                None,
                DispatchConsistency::Isolated,
            )
            .await
            .unwrap();

        let sent = client.sender.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].message_id, "small");
    }

    #[tokio::test]
    async fn rejected_oversized_message_fails_the_dispatch() {
        let client = RecordingClient::with_limit(16);
        let router = OutgoingBatchRouter::new(
            Arc::new(FixedClientProvider { client }),
            Arc::new(RejectOversizedMessages),
        );

        let result = router
            .route_batches(
                vec![batch(
                    "orders",
                    vec![OutgoingMessage::new("big", "orders", vec![0u8; 128])],
                )],
                None,
                DispatchConsistency::Isolated,
            )
            .await;

        match result {
            Err(DispatchError::OversizedRejected { message_id, .. }) => {
                assert_eq!(message_id, "big");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
