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

mod config;

use crate::config::{
    CompositionTag, Config, PartitioningTag, PurposeTag, ReceiveModeTag,
};
use bus_topology::{
    AddressingLogic, Batcher, BrokerError, BundleSettings, CompositionStrategy,
    CriticalErrorHandler, DispatchConsistency, FanOutNamespacePartitioning, FlatComposition,
    HierarchyComposition, IncomingMessageDetails, MessageHandler, NamespacePurpose,
    NamespaceRegistry, OutgoingBatchRouter, OutgoingMessage, PartitioningStrategy, ProcessingError,
    QueueBindings, ReceiveContext, ReceiveMode, ReceiveSettings, RejectOversizedMessages,
    RetryPolicy, SingleNamespacePartitioning, StandardSanitization, TopologyCreator,
    TopologyOperator, TopologyResourcesCreator, TopologySectionManager, TopologySettings,
};
use clap::Parser;
use in_memory_broker::InMemoryBroker;
use std::error::Error;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command()]
struct HostArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

struct LoggingMessageHandler;

#[async_trait::async_trait]
impl MessageHandler for LoggingMessageHandler {
    async fn on_message(
        &self,
        message: IncomingMessageDetails,
        context: ReceiveContext,
    ) -> Result<(), ProcessingError> {
        info!(
            message_id = message.message_id.as_str(),
            entity = context.entity_path.as_str(),
            namespace = context.namespace_alias.as_str(),
            bytes = message.body.len(),
            "received message"
        );
        Ok(())
    }
}

struct LoggingCriticalHandler;

impl CriticalErrorHandler for LoggingCriticalHandler {
    fn on_critical(&self, error: BrokerError) {
        error!(err = %error, "critical receive failure");
    }
}

/// Everything the host wires together, built explicitly from configuration.
struct Engine {
    registry: Arc<NamespaceRegistry>,
    sections: Arc<TopologySectionManager>,
    resources: TopologyResourcesCreator,
    operator: TopologyOperator,
    router: OutgoingBatchRouter,
    bindings: QueueBindings,
    local_address: String,
    max_concurrency: usize,
}

/// Collapses the serde-facing configuration into the engine's read-once
/// settings surface.
fn topology_settings(config: &Config) -> TopologySettings {
    TopologySettings {
        default_namespace_alias: config.addressing.default_namespace_alias.clone(),
        bundle: BundleSettings {
            number_of_entities: config.bundle.number_of_entities,
            prefix: config.bundle.prefix.clone(),
        },
        receive: ReceiveSettings {
            mode: match config.receive.mode {
                ReceiveModeTag::PeekLock => ReceiveMode::PeekLock,
                ReceiveModeTag::ReceiveAndDelete => ReceiveMode::ReceiveAndDelete,
            },
            auto_renew_timeout: Duration::from_secs(config.receive.auto_renew_timeout_secs),
            clients_per_entity: config.receive.clients_per_entity,
        },
    }
}

fn build_engine(config: Config, broker: Arc<InMemoryBroker>) -> Result<Engine, Box<dyn Error>> {
    let settings = topology_settings(&config);

    let mut registry = NamespaceRegistry::new();
    for namespace in &config.namespaces {
        let purpose = match namespace.purpose {
            PurposeTag::Sending => NamespacePurpose::Sending,
            PurposeTag::Receiving => NamespacePurpose::Receiving,
        };
        registry.add(&namespace.alias, &namespace.connection, purpose);
    }
    let registry = Arc::new(registry);

    let partitioning: Arc<dyn PartitioningStrategy> = match config.addressing.partitioning {
        PartitioningTag::SingleNamespace => Arc::new(SingleNamespacePartitioning::new(
            &registry,
            &settings.default_namespace_alias,
        )?),
        PartitioningTag::FanOut => Arc::new(FanOutNamespacePartitioning::new(&registry)?),
    };
    let composition: Arc<dyn CompositionStrategy> = match config.addressing.composition {
        CompositionTag::Flat => Arc::new(FlatComposition),
        CompositionTag::Hierarchy => Arc::new(HierarchyComposition),
    };
    let addressing = AddressingLogic::new(
        Arc::new(StandardSanitization::new(config.addressing.max_path_length)),
        composition,
    );

    let sections = Arc::new(TopologySectionManager::new(
        settings.bundle.clone(),
        partitioning,
        addressing,
    ));

    let mut bindings = QueueBindings::new();
    for address in &config.bindings.receiving {
        bindings.bind_receiving(address);
    }
    for address in &config.bindings.sending {
        bindings.bind_sending(address);
    }

    let provider: Arc<InMemoryBroker> = broker;
    let resources = TopologyResourcesCreator::new(
        TopologyCreator::new(provider.clone(), RetryPolicy::default()),
        sections.clone(),
        registry.clone(),
        bindings.clone(),
        config.endpoint.local_address.clone(),
    );
    let operator = TopologyOperator::new(provider.clone(), settings.receive.clone());
    let router = OutgoingBatchRouter::new(provider, Arc::new(RejectOversizedMessages));

    Ok(Engine {
        registry,
        sections,
        resources,
        operator,
        router,
        bindings,
        local_address: config.endpoint.local_address,
        max_concurrency: config.endpoint.max_concurrency,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started bus-topology-host");

    let args = HostArgs::parse();
    let contents = fs::read_to_string(&args.config)?;
    let config: Config = json5::from_str(&contents)?;

    let broker = Arc::new(InMemoryBroker::new());
    let engine = build_engine(config, broker.clone())?;
    info!(namespaces = engine.registry.len(), "namespace registry ready");

    engine.resources.create_if_necessary().await?;

    engine
        .operator
        .on_incoming_message(Arc::new(LoggingMessageHandler));
    engine
        .operator
        .on_critical_error(Arc::new(LoggingCriticalHandler));

    let section = engine
        .sections
        .determine_queues_to_create(&engine.bindings, &engine.local_address)
        .await;
    engine.operator.start(&section, engine.max_concurrency).await?;

    // Round-trip one demo message through the dispatch path so a fresh host
    // shows traffic immediately.
    let batcher = Batcher::new(engine.sections.clone());
    let greeting = OutgoingMessage::new("greeting-1", &engine.local_address, b"hello".to_vec());
    engine
        .router
        .route_batches(
            batcher.batch(vec![greeting]),
            None,
            DispatchConsistency::Isolated,
        )
        .await?;

    // The in-memory broker keeps traffic local to this process; swap the
    // provider in build_engine to target a real fleet.
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    engine.operator.stop().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_engine, topology_settings};
    use crate::config::Config;
    use bus_topology::ReceiveMode;
    use in_memory_broker::InMemoryBroker;
    use std::sync::Arc;
    use std::time::Duration;

    fn demo_config() -> Config {
        json5::from_str(
            r#"{
              endpoint: { local_address: "sales-endpoint", max_concurrency: 4 },
              namespaces: [
                { alias: "default", connection: "inmem://fleet-a", purpose: "receiving" },
              ],
              addressing: { partitioning: "single_namespace", composition: "flat" },
              receive: {
                mode: "receive_and_delete",
                auto_renew_timeout_secs: 30,
                clients_per_entity: 1,
              },
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn settings_are_read_once_from_the_config() {
        let settings = topology_settings(&demo_config());

        assert_eq!(settings.default_namespace_alias, "default");
        assert_eq!(settings.bundle.number_of_entities, 2);
        assert_eq!(settings.bundle.prefix, "bundle-");
        assert_eq!(settings.receive.mode, ReceiveMode::ReceiveAndDelete);
        assert_eq!(settings.receive.auto_renew_timeout, Duration::from_secs(30));
        assert_eq!(settings.receive.clients_per_entity, 1);
    }

    #[test]
    fn demo_config_builds_an_engine() {
        let engine = build_engine(demo_config(), Arc::new(InMemoryBroker::new())).unwrap();

        assert_eq!(engine.registry.len(), 1);
        assert_eq!(engine.local_address, "sales-endpoint");
        assert_eq!(engine.max_concurrency, 4);
    }
}
