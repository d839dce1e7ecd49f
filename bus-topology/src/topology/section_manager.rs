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

//! Computes the entity plan for a set of queue bindings.

use crate::addressing::{AddressingLogic, PartitioningStrategy};
use crate::broker::EntityKind;
use crate::namespaces::NamespacePurpose;
use crate::observability::events;
use crate::settings::BundleSettings;
use crate::topology::entities::{EntityInfo, TopologySection};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const COMPONENT: &str = "topology_section_manager";

/// Declared input/output queue bindings of the hosted endpoint.
#[derive(Clone, Debug, Default)]
pub struct QueueBindings {
    pub receiving: Vec<String>,
    pub sending: Vec<String>,
}

impl QueueBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_receiving(&mut self, address: impl Into<String>) {
        self.receiving.push(address.into());
    }

    pub fn bind_sending(&mut self, address: impl Into<String>) {
        self.sending.push(address.into());
    }
}

/// Resolves logical bindings into the ordered entity sets the creator and
/// operator work from. A section is a pure function of bindings, settings and
/// registry state, so repeated resolution yields identical sections.
pub struct TopologySectionManager {
    bundle: BundleSettings,
    partitioning: Arc<dyn PartitioningStrategy>,
    addressing: AddressingLogic,
    bundle_topics: Mutex<Option<Vec<String>>>,
}

impl TopologySectionManager {
    pub fn new(
        bundle: BundleSettings,
        partitioning: Arc<dyn PartitioningStrategy>,
        addressing: AddressingLogic,
    ) -> Self {
        Self {
            bundle,
            partitioning,
            addressing,
            bundle_topics: Mutex::new(None),
        }
    }

    /// One-time discovery: resolves the bundle-topic layout. Idempotent; only
    /// the first call has effect.
    pub async fn initialize(&self) {
        let mut bundle_topics = self.bundle_topics.lock().await;

        if bundle_topics.is_some() {
            debug!(
                event = events::SECTION_INITIALIZE_SKIPPED,
                component = COMPONENT,
                "sections already initialized"
            );
            return;
        }

        let topics: Vec<String> = (1..=self.bundle.number_of_entities)
            .map(|index| self.bundle_topic_path(index))
            .collect();

        debug!(
            event = events::SECTION_INITIALIZE_OK,
            component = COMPONENT,
            bundle_topics = topics.len(),
            "resolved bundle topic layout"
        );
        *bundle_topics = Some(topics);
    }

    fn bundle_topic_path(&self, index: usize) -> String {
        self.addressing
            .legalize(&format!("{}{index}", self.bundle.prefix))
    }

    /// Stable bundle index for a logical queue, derived from a deterministic
    /// hash rather than creation order so re-resolution after a restart
    /// reproduces the same assignment.
    pub fn bundle_index(&self, logical_address: &str) -> usize {
        (stable_hash(logical_address) % self.bundle.number_of_entities as u64) as usize
    }

    /// Physical bundle topic hosting a logical address.
    pub fn bundle_path_for(&self, logical_address: &str) -> String {
        self.bundle_topic_path(self.bundle_index(logical_address) + 1)
    }

    /// Emits one entity per binding per namespace selected by the
    /// partitioning strategy, deduplicated by (path, namespace).
    pub async fn determine_queues_to_create(
        &self,
        bindings: &QueueBindings,
        local_address: &str,
    ) -> TopologySection {
        self.initialize().await;

        let mut entities: Vec<EntityInfo> = Vec::new();
        let local_path = self.addressing.legalize(local_address);
        let local_bundle = self.bundle_path_for(local_address);

        for namespace in self
            .partitioning
            .select_namespaces(NamespacePurpose::Receiving)
        {
            entities.push(EntityInfo::new(
                local_path.clone(),
                EntityKind::Queue,
                namespace.clone(),
                true,
            ));

            for binding in &bindings.receiving {
                entities.push(EntityInfo::new(
                    self.addressing.legalize(binding),
                    EntityKind::Queue,
                    namespace.clone(),
                    true,
                ));
            }

            // The local endpoint listens to its slice of the bundle through a
            // subscription under its assigned bundle topic.
            entities.push(EntityInfo::new(
                local_bundle.clone(),
                EntityKind::Topic,
                namespace.clone(),
                false,
            ));
            entities.push(EntityInfo::new(
                self.addressing.apply(&[&local_bundle, local_address]),
                EntityKind::Subscription,
                namespace,
                true,
            ));
        }

        let bundle_topics = {
            let guard = self.bundle_topics.lock().await;
            guard.clone().unwrap_or_default()
        };

        for namespace in self
            .partitioning
            .select_namespaces(NamespacePurpose::Sending)
        {
            for binding in &bindings.sending {
                entities.push(EntityInfo::new(
                    self.addressing.legalize(binding),
                    EntityKind::Queue,
                    namespace.clone(),
                    false,
                ));
            }

            for topic in &bundle_topics {
                entities.push(EntityInfo::new(
                    topic.clone(),
                    EntityKind::Topic,
                    namespace.clone(),
                    false,
                ));
            }
        }

        TopologySection::from_entities(entities)
    }

    /// Physical destinations for one outgoing logical address, one per
    /// sending namespace, in partitioning order.
    pub fn determine_send_destinations(&self, logical_address: &str) -> Vec<EntityInfo> {
        let path = self.addressing.legalize(logical_address);

        self.partitioning
            .select_namespaces(NamespacePurpose::Sending)
            .into_iter()
            .map(|namespace| EntityInfo::new(path.clone(), EntityKind::Queue, namespace, false))
            .collect()
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// FNV-1a; bundle assignment must survive restarts, so the default hasher's
// per-process seeding is unusable here.
fn stable_hash(value: &str) -> u64 {
    value.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::{QueueBindings, TopologySectionManager};
    use crate::addressing::{
        AddressingLogic, FanOutNamespacePartitioning, FlatComposition, StandardSanitization,
    };
    use crate::broker::EntityKind;
    use crate::namespaces::{NamespacePurpose, NamespaceRegistry};
    use crate::settings::BundleSettings;
    use std::sync::Arc;

    fn manager_with_namespaces(sending: usize, receiving: usize) -> TopologySectionManager {
        let mut registry = NamespaceRegistry::new();
        for index in 0..sending {
            registry.add(
                &format!("send-{index}"),
                &format!("send-connection-{index}"),
                NamespacePurpose::Sending,
            );
        }
        for index in 0..receiving {
            registry.add(
                &format!("recv-{index}"),
                &format!("recv-connection-{index}"),
                NamespacePurpose::Receiving,
            );
        }

        TopologySectionManager::new(
            BundleSettings::default(),
            Arc::new(FanOutNamespacePartitioning::new(&registry).unwrap()),
            AddressingLogic::new(
                Arc::new(StandardSanitization::default()),
                Arc::new(FlatComposition),
            ),
        )
    }

    #[tokio::test]
    async fn one_sending_binding_yields_one_entity_per_sending_namespace() {
        let manager = manager_with_namespaces(2, 1);
        let mut bindings = QueueBindings::new();
        bindings.bind_sending("audit");

        let section = manager.determine_queues_to_create(&bindings, "local").await;

        let audit_entities: Vec<_> = section
            .iter()
            .filter(|entity| entity.path == "audit")
            .collect();
        assert_eq!(audit_entities.len(), 2);
        assert_eq!(audit_entities[0].namespace.alias, "send-0");
        assert_eq!(audit_entities[1].namespace.alias, "send-1");
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let manager = manager_with_namespaces(1, 1);
        let mut bindings = QueueBindings::new();
        bindings.bind_receiving("errors");
        bindings.bind_sending("audit");

        let first = manager.determine_queues_to_create(&bindings, "local").await;
        let second = manager.determine_queues_to_create(&bindings, "local").await;

        let first_keys: Vec<_> = first.iter().map(|entity| entity.key()).collect();
        let second_keys: Vec<_> = second.iter().map(|entity| entity.key()).collect();
        assert_eq!(first_keys, second_keys);
    }

    #[tokio::test]
    async fn local_queue_and_subscription_are_listened_to() {
        let manager = manager_with_namespaces(1, 1);

        let section = manager
            .determine_queues_to_create(&QueueBindings::new(), "local")
            .await;

        let listened: Vec<_> = section
            .iter()
            .filter(|entity| entity.should_be_listened_to)
            .collect();
        assert_eq!(listened.len(), 2);
        assert!(listened
            .iter()
            .any(|entity| entity.kind == EntityKind::Queue && entity.path == "local"));
        assert!(listened
            .iter()
            .any(|entity| entity.kind == EntityKind::Subscription));
    }

    #[tokio::test]
    async fn bundle_topics_are_planned_for_sending_namespaces() {
        let manager = manager_with_namespaces(1, 1);

        let section = manager
            .determine_queues_to_create(&QueueBindings::new(), "local")
            .await;

        let topics: Vec<_> = section
            .iter()
            .filter(|entity| entity.kind == EntityKind::Topic && entity.namespace.alias == "send-0")
            .collect();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].path, "bundle-1");
        assert_eq!(topics[1].path, "bundle-2");
    }

    #[test]
    fn bundle_index_is_stable_and_in_range() {
        let manager = manager_with_namespaces(1, 1);

        let index = manager.bundle_index("sales-endpoint");
        assert_eq!(index, manager.bundle_index("sales-endpoint"));
        assert!(index < 2);
        assert_eq!(
            manager.bundle_path_for("sales-endpoint"),
            format!("bundle-{}", index + 1)
        );
    }

    #[test]
    fn send_destinations_preserve_partitioning_order() {
        let manager = manager_with_namespaces(2, 1);

        let destinations = manager.determine_send_destinations("billing requests");

        assert_eq!(destinations.len(), 2);
        assert_eq!(destinations[0].path, "billing-requests");
        assert_eq!(destinations[0].namespace.alias, "send-0");
        assert_eq!(destinations[1].namespace.alias, "send-1");
    }
}
