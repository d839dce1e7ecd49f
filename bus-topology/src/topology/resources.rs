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

//! Once-guarded resource provisioning for the hosted endpoint.

use crate::namespaces::NamespaceRegistry;
use crate::observability::events;
use crate::topology::creator::{TopologyCreateError, TopologyCreator};
use crate::topology::section_manager::{QueueBindings, TopologySectionManager};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

const COMPONENT: &str = "topology_resources_creator";

/// Runs the full provisioning pipeline for the endpoint exactly once per
/// process: rights check, section resolution, then creation.
pub struct TopologyResourcesCreator {
    creator: TopologyCreator,
    sections: Arc<TopologySectionManager>,
    registry: Arc<NamespaceRegistry>,
    bindings: QueueBindings,
    local_address: String,
    created: Mutex<bool>,
}

impl TopologyResourcesCreator {
    pub fn new(
        creator: TopologyCreator,
        sections: Arc<TopologySectionManager>,
        registry: Arc<NamespaceRegistry>,
        bindings: QueueBindings,
        local_address: impl Into<String>,
    ) -> Self {
        Self {
            creator,
            sections,
            registry,
            bindings,
            local_address: local_address.into(),
            created: Mutex::new(false),
        }
    }

    /// Provisions the endpoint topology unless a prior call already succeeded.
    /// A failed attempt leaves the guard unset so the next call retries the
    /// whole pipeline.
    pub async fn create_if_necessary(&self) -> Result<(), TopologyCreateError> {
        let mut created = self.created.lock().await;
        if *created {
            debug!(
                event = events::RESOURCES_SKIPPED,
                component = COMPONENT,
                "topology already provisioned"
            );
            return Ok(());
        }

        self.creator.assert_managed_rights(&self.registry).await?;

        let section = self
            .sections
            .determine_queues_to_create(&self.bindings, &self.local_address)
            .await;
        self.creator.create(&section).await?;

        *created = true;
        info!(
            event = events::RESOURCES_CREATED,
            component = COMPONENT,
            entities = section.len(),
            "topology provisioned"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TopologyResourcesCreator;
    use crate::addressing::{
        AddressingLogic, FanOutNamespacePartitioning, FlatComposition, StandardSanitization,
    };
    use crate::broker::{
        BrokerClient, BrokerClientProvider, BrokerError, BrokerSender, EntityKind, ReceiveStream,
    };
    use crate::namespaces::{NamespaceInfo, NamespacePurpose, NamespaceRegistry};
    use crate::settings::BundleSettings;
    use crate::topology::creator::{RetryPolicy, TopologyCreator};
    use crate::topology::section_manager::{QueueBindings, TopologySectionManager};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingClient {
        create_calls: AtomicUsize,
    }

    #[async_trait]
    impl BrokerClient for CountingClient {
        async fn create_entity(&self, _path: &str, _kind: EntityKind) -> Result<(), BrokerError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn entity_exists(&self, _path: &str) -> Result<bool, BrokerError> {
            Ok(false)
        }

        async fn can_manage_entities(&self) -> Result<bool, BrokerError> {
            Ok(true)
        }

        async fn open_sender(&self) -> Result<Arc<dyn BrokerSender>, BrokerError> {
            Err(BrokerError::permanent("senders not modeled"))
        }

        async fn open_receiver(
            &self,
            _path: &str,
            _kind: EntityKind,
        ) -> Result<Box<dyn ReceiveStream>, BrokerError> {
            Err(BrokerError::permanent("receivers not modeled"))
        }

        fn message_size_limit(&self) -> usize {
            256 * 1024
        }
    }

    struct FixedClientProvider {
        client: Arc<CountingClient>,
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

    fn resources_with_client(client: Arc<CountingClient>) -> TopologyResourcesCreator {
        let mut registry = NamespaceRegistry::new();
        registry.add("recv", "recv-connection", NamespacePurpose::Receiving);
        registry.add("send", "send-connection", NamespacePurpose::Sending);
        let registry = Arc::new(registry);

        let sections = Arc::new(TopologySectionManager::new(
            BundleSettings::default(),
            Arc::new(FanOutNamespacePartitioning::new(&registry).unwrap()),
            AddressingLogic::new(
                Arc::new(StandardSanitization::default()),
                Arc::new(FlatComposition),
            ),
        ));

        let mut bindings = QueueBindings::new();
        bindings.bind_sending("audit");

        TopologyResourcesCreator::new(
            TopologyCreator::new(
                Arc::new(FixedClientProvider { client }),
                RetryPolicy::new(3, Duration::from_millis(1)),
            ),
            sections,
            registry,
            bindings,
            "local-endpoint",
        )
    }

    #[tokio::test]
    async fn second_call_is_a_no_op() {
        let client = Arc::new(CountingClient {
            create_calls: AtomicUsize::new(0),
        });
        let resources = resources_with_client(client.clone());

        resources.create_if_necessary().await.unwrap();
        let created = client.create_calls.load(Ordering::SeqCst);
        assert!(created > 0);

        resources.create_if_necessary().await.unwrap();
        assert_eq!(client.create_calls.load(Ordering::SeqCst), created);
    }
}
