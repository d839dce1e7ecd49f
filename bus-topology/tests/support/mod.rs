use async_trait::async_trait;
use bus_topology::{
    AddressingLogic, BundleSettings, FlatComposition, IncomingMessageDetails, MessageHandler,
    NamespacePurpose, NamespaceRegistry, ProcessingError, QueueBindings, ReceiveContext,
    SingleNamespacePartitioning, StandardSanitization, TopologySectionManager,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub(crate) const CONNECTION: &str = "inmem://fleet-a";

pub(crate) fn single_namespace_registry() -> Arc<NamespaceRegistry> {
    let mut registry = NamespaceRegistry::new();
    registry.add("default", CONNECTION, NamespacePurpose::Receiving);
    Arc::new(registry)
}

pub(crate) fn sections_for(registry: &Arc<NamespaceRegistry>) -> Arc<TopologySectionManager> {
    Arc::new(TopologySectionManager::new(
        BundleSettings::default(),
        Arc::new(
            SingleNamespacePartitioning::new(registry, "default")
                .expect("default namespace should be registered"),
        ),
        AddressingLogic::new(
            Arc::new(StandardSanitization::default()),
            Arc::new(FlatComposition),
        ),
    ))
}

#[allow(dead_code)]
pub(crate) fn bindings(receiving: &[&str], sending: &[&str]) -> QueueBindings {
    let mut bindings = QueueBindings::new();
    for address in receiving {
        bindings.bind_receiving(*address);
    }
    for address in sending {
        bindings.bind_sending(*address);
    }
    bindings
}

#[allow(dead_code)]
pub(crate) fn incoming(message_id: &str) -> IncomingMessageDetails {
    IncomingMessageDetails {
        message_id: message_id.to_string(),
        headers: HashMap::new(),
        body: b"payload".to_vec(),
        delivery_count: 1,
    }
}

#[allow(dead_code)]
pub(crate) struct RecordingHandler {
    pub(crate) seen: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl RecordingHandler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) async fn message_ids(&self) -> Vec<String> {
        self.seen
            .lock()
            .await
            .iter()
            .map(|(message_id, _)| message_id.clone())
            .collect()
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn on_message(
        &self,
        message: IncomingMessageDetails,
        context: ReceiveContext,
    ) -> Result<(), ProcessingError> {
        self.seen
            .lock()
            .await
            .push((message.message_id, context.entity_path));
        Ok(())
    }
}

#[allow(dead_code)]
pub(crate) async fn wait_until<F>(mut condition: F, what: &str)
where
    F: FnMut() -> bool,
{
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}
