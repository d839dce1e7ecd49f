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

//! # bus-topology
//!
//! `bus-topology` routes application messages over a multi-namespace broker
//! fleet: it resolves where logical destinations physically live, asserts the
//! required broker entities, pumps incoming messages through a
//! concurrency-limited set of per-entity receive loops, and batches outgoing
//! messages to cached senders with oversized-payload fallback.
//!
//! Typical usage wires a [`NamespaceRegistry`] and addressing strategies into
//! a [`TopologySectionManager`], provisions with a [`TopologyCreator`], and
//! pumps with a [`TopologyOperator`]. The broker itself stays behind the
//! [`BrokerClientProvider`] seam.
//!
//! ```
//! use std::sync::Arc;
//! use bus_topology::{
//!     AddressingLogic, FanOutNamespacePartitioning, FlatComposition, NamespacePurpose,
//!     NamespaceRegistry, QueueBindings, RetryPolicy, StandardSanitization,
//!     TopologyCreator, TopologySectionManager,
//! };
//!
//! # pub mod mock_broker {
//! #     use std::sync::Arc;
//! #     use async_trait::async_trait;
//! #     use bus_topology::{
//! #         BrokerClient, BrokerClientProvider, BrokerError, BrokerSender, EntityKind,
//! #         NamespaceInfo, ReceiveStream,
//! #     };
//! #
//! #     pub struct MockClient;
//! #
//! #     #[async_trait]
//! #     impl BrokerClient for MockClient {
//! #         async fn create_entity(&self, _path: &str, _kind: EntityKind) -> Result<(), BrokerError> {
//! #             Ok(())
//! #         }
//! #         async fn entity_exists(&self, _path: &str) -> Result<bool, BrokerError> {
//! #             Ok(false)
//! #         }
//! #         async fn can_manage_entities(&self) -> Result<bool, BrokerError> {
//! #             Ok(true)
//! #         }
//! #         async fn open_sender(&self) -> Result<Arc<dyn BrokerSender>, BrokerError> {
//! #             Err(BrokerError::permanent("not needed for this doctest"))
//! #         }
//! #         async fn open_receiver(
//! #             &self,
//! #             _path: &str,
//! #             _kind: EntityKind,
//! #         ) -> Result<Box<dyn ReceiveStream>, BrokerError> {
//! #             Err(BrokerError::permanent("not needed for this doctest"))
//! #         }
//! #         fn message_size_limit(&self) -> usize {
//! #             256 * 1024
//! #         }
//! #     }
//! #
//! #     pub struct MockProvider;
//! #
//! #     #[async_trait]
//! #     impl BrokerClientProvider for MockProvider {
//! #         async fn client_for(
//! #             &self,
//! #             _namespace: &NamespaceInfo,
//! #         ) -> Result<Arc<dyn BrokerClient>, BrokerError> {
//! #             Ok(Arc::new(MockClient))
//! #         }
//! #     }
//! # }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut registry = NamespaceRegistry::new();
//! registry.add("primary", "connection-1", NamespacePurpose::Receiving);
//! registry.add("secondary", "connection-2", NamespacePurpose::Sending);
//!
//! let sections = TopologySectionManager::new(
//!     Default::default(),
//!     Arc::new(FanOutNamespacePartitioning::new(&registry).unwrap()),
//!     AddressingLogic::new(
//!         Arc::new(StandardSanitization::default()),
//!         Arc::new(FlatComposition),
//!     ),
//! );
//!
//! let mut bindings = QueueBindings::new();
//! bindings.bind_sending("audit");
//! let section = sections.determine_queues_to_create(&bindings, "sales").await;
//!
//! let creator = TopologyCreator::new(
//!     Arc::new(mock_broker::MockProvider),
//!     RetryPolicy::default(),
//! );
//! creator.create(&section).await.unwrap();
//! # });
//! ```

pub mod addressing;
pub mod broker;
pub mod callbacks;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod namespaces;
pub mod settings;
pub mod topology;

#[doc(hidden)]
pub mod observability;

pub use addressing::{
    AddressingLogic, CompositionStrategy, FanOutNamespacePartitioning, FlatComposition,
    HierarchyComposition, PartitioningStrategy, SanitizationStrategy,
    SingleNamespacePartitioning, StandardSanitization,
};
pub use broker::{
    BrokerClient, BrokerClientProvider, BrokerError, BrokerErrorKind, BrokerSender, EntityKind,
    ReceiveStream,
};
pub use callbacks::{CriticalErrorHandler, ErrorHandler, MessageHandler, ProcessingFailureHandler};
pub use dispatch::{
    Batch, Batcher, DispatchError, OutgoingBatchRouter, OversizedMessageHandler,
    OversizedMessageOutcome, RejectOversizedMessages,
};
pub use error::ConfigurationError;
pub use messages::{
    DispatchConsistency, ErrorContext, ErrorHandleResult, IncomingMessageDetails, OutgoingMessage,
    ProcessingError, ReceiveContext, WireMessage,
};
pub use namespaces::{NamespaceInfo, NamespaceNotFound, NamespacePurpose, NamespaceRegistry};
pub use settings::{BundleSettings, ReceiveMode, ReceiveSettings, TopologySettings};
pub use topology::{
    EntityInfo, EntityKey, NotifierLifecycleError, OperatorError, QueueBindings, RetryPolicy,
    TopologyCreateError, TopologyCreator, TopologyOperator, TopologyResourcesCreator,
    TopologySection, TopologySectionManager, UnsupportedEntityType,
};
