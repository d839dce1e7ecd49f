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

//! In-memory broker fake: one process-local "fleet" keyed by namespace
//! connection, with scripted failure injection for tests.

use async_trait::async_trait;
use bus_topology::{
    BrokerClient, BrokerClientProvider, BrokerError, BrokerSender, EntityKind,
    IncomingMessageDetails, NamespaceInfo, ReceiveStream, WireMessage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::debug;

const COMPONENT: &str = "in_memory_broker";
const DEFAULT_SIZE_LIMIT: usize = 256 * 1024;

/// Initializes test logging once per process; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt::try_init();
}

struct QueueState {
    messages: VecDeque<IncomingMessageDetails>,
    closed: bool,
}

impl QueueState {
    fn empty() -> Self {
        Self {
            messages: VecDeque::new(),
            closed: false,
        }
    }
}

#[derive(Default)]
struct NamespaceStore {
    entities: HashMap<String, EntityKind>,
    queues: HashMap<String, QueueState>,
    sent: Vec<WireMessage>,
    scripted_create_failures: HashMap<String, Vec<BrokerError>>,
    scripted_receive_failures: HashMap<String, Vec<BrokerError>>,
}

struct BrokerState {
    stores: HashMap<String, NamespaceStore>,
    deny_manage_rights: bool,
    message_size_limit: usize,
}

struct BrokerInner {
    state: Mutex<BrokerState>,
    wakeup: Notify,
}

impl BrokerInner {
    fn lock_state(&self) -> MutexGuard<'_, BrokerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Process-local broker fleet shared by every client the provider hands out.
/// Stores are keyed by the namespace connection string, mirroring how a real
/// fleet separates state per namespace. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct InMemoryBroker {
    inner: Arc<BrokerInner>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BrokerInner {
                state: Mutex::new(BrokerState {
                    stores: HashMap::new(),
                    deny_manage_rights: false,
                    message_size_limit: DEFAULT_SIZE_LIMIT,
                }),
                wakeup: Notify::new(),
            }),
        }
    }

    pub fn set_message_size_limit(&self, limit: usize) {
        self.inner.lock_state().message_size_limit = limit;
    }

    pub fn deny_manage_rights(&self) {
        self.inner.lock_state().deny_manage_rights = true;
    }

    /// Scripts errors for `create_entity` calls against `path` on
    /// `connection`; each call consumes one scripted error until the list is
    /// exhausted, after which creation succeeds.
    pub fn fail_create(&self, connection: &str, path: &str, errors: Vec<BrokerError>) {
        self.inner
            .lock_state()
            .stores
            .entry(connection.to_string())
            .or_default()
            .scripted_create_failures
            .insert(path.to_string(), errors);
    }

    /// Scripts errors for `next_message` calls against the receive stream of
    /// `path`; each receive consumes one scripted error until the list is
    /// exhausted.
    pub fn fail_receive(&self, connection: &str, path: &str, errors: Vec<BrokerError>) {
        self.inner
            .lock_state()
            .stores
            .entry(connection.to_string())
            .or_default()
            .scripted_receive_failures
            .insert(path.to_string(), errors);
        self.inner.wakeup.notify_waiters();
    }

    /// Test hook: enqueues a message as if it arrived from the wire.
    pub fn deliver(&self, connection: &str, path: &str, message: IncomingMessageDetails) {
        debug!(
            component = COMPONENT,
            connection,
            path,
            message_id = message.message_id.as_str(),
            "message delivered"
        );
        {
            let mut state = self.inner.lock_state();
            let store = state.stores.entry(connection.to_string()).or_default();
            store
                .queues
                .entry(path.to_string())
                .or_insert_with(QueueState::empty)
                .messages
                .push_back(message);
        }
        self.inner.wakeup.notify_waiters();
    }

    /// Test hook: closes the receive stream of `path`, as a broker-side
    /// disconnect would.
    pub fn close_stream(&self, connection: &str, path: &str) {
        debug!(component = COMPONENT, connection, path, "stream closed");
        {
            let mut state = self.inner.lock_state();
            let store = state.stores.entry(connection.to_string()).or_default();
            if let Some(queue) = store.queues.get_mut(path) {
                queue.closed = true;
            }
        }
        self.inner.wakeup.notify_waiters();
    }

    /// Everything sent through this connection, in send order.
    pub fn sent(&self, connection: &str) -> Vec<WireMessage> {
        self.inner
            .lock_state()
            .stores
            .get(connection)
            .map(|store| store.sent.clone())
            .unwrap_or_default()
    }

    /// Entity paths created on this connection, sorted for assertion
    /// stability.
    pub fn created_entities(&self, connection: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .inner
            .lock_state()
            .stores
            .get(connection)
            .map(|store| store.entities.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BrokerClientProvider for InMemoryBroker {
    async fn client_for(
        &self,
        namespace: &NamespaceInfo,
    ) -> Result<Arc<dyn BrokerClient>, BrokerError> {
        Ok(Arc::new(InMemoryClient {
            inner: self.inner.clone(),
            connection: namespace.connection.clone(),
        }))
    }
}

struct InMemoryClient {
    inner: Arc<BrokerInner>,
    connection: String,
}

#[async_trait]
impl BrokerClient for InMemoryClient {
    async fn create_entity(&self, path: &str, kind: EntityKind) -> Result<(), BrokerError> {
        let mut state = self.inner.lock_state();
        let store = state.stores.entry(self.connection.clone()).or_default();

        if let Some(errors) = store.scripted_create_failures.get_mut(path) {
            if !errors.is_empty() {
                return Err(errors.remove(0));
            }
        }

        if store.entities.contains_key(path) {
            return Err(BrokerError::already_exists(format!(
                "entity `{path}` already exists"
            )));
        }

        store.entities.insert(path.to_string(), kind);
        store.queues.insert(path.to_string(), QueueState::empty());
        debug!(
            component = COMPONENT,
            connection = self.connection.as_str(),
            path,
            kind = %kind,
            "entity created"
        );
        Ok(())
    }

    async fn entity_exists(&self, path: &str) -> Result<bool, BrokerError> {
        let mut state = self.inner.lock_state();
        let store = state.stores.entry(self.connection.clone()).or_default();
        Ok(store.entities.contains_key(path))
    }

    async fn can_manage_entities(&self) -> Result<bool, BrokerError> {
        Ok(!self.inner.lock_state().deny_manage_rights)
    }

    async fn open_sender(&self) -> Result<Arc<dyn BrokerSender>, BrokerError> {
        Ok(Arc::new(InMemorySender {
            inner: self.inner.clone(),
            connection: self.connection.clone(),
        }))
    }

    async fn open_receiver(
        &self,
        path: &str,
        _kind: EntityKind,
    ) -> Result<Box<dyn ReceiveStream>, BrokerError> {
        {
            let mut state = self.inner.lock_state();
            let store = state.stores.entry(self.connection.clone()).or_default();
            store
                .queues
                .entry(path.to_string())
                .or_insert_with(QueueState::empty);
        }

        Ok(Box::new(InMemoryStream {
            inner: self.inner.clone(),
            connection: self.connection.clone(),
            path: path.to_string(),
        }))
    }

    fn message_size_limit(&self) -> usize {
        self.inner.lock_state().message_size_limit
    }
}

struct InMemorySender {
    inner: Arc<BrokerInner>,
    connection: String,
}

#[async_trait]
impl BrokerSender for InMemorySender {
    async fn send(&self, message: WireMessage) -> Result<(), BrokerError> {
        {
            let mut state = self.inner.lock_state();
            let store = state.stores.entry(self.connection.clone()).or_default();

            if !store.entities.contains_key(&message.path) {
                return Err(BrokerError::not_found(format!(
                    "no entity at `{}`",
                    message.path
                )));
            }

            let incoming = IncomingMessageDetails {
                message_id: message.message_id.clone(),
                headers: message.headers.clone(),
                body: message.body.clone(),
                delivery_count: 1,
            };
            if let Some(queue) = store.queues.get_mut(&message.path) {
                queue.messages.push_back(incoming);
            }
            debug!(
                component = COMPONENT,
                connection = self.connection.as_str(),
                path = message.path.as_str(),
                message_id = message.message_id.as_str(),
                "message sent"
            );
            store.sent.push(message);
        }

        self.inner.wakeup.notify_waiters();
        Ok(())
    }
}

struct InMemoryStream {
    inner: Arc<BrokerInner>,
    connection: String,
    path: String,
}

#[async_trait]
impl ReceiveStream for InMemoryStream {
    async fn next_message(&mut self) -> Result<Option<IncomingMessageDetails>, BrokerError> {
        loop {
            // `notify_waiters` only wakes futures that are already registered,
            // so the waiter must be enabled before the state check or a
            // delivery landing in between would be lost.
            let waiter = self.inner.wakeup.notified();
            tokio::pin!(waiter);
            waiter.as_mut().enable();
            {
                let mut state = self.inner.lock_state();
                let store = state.stores.entry(self.connection.clone()).or_default();
                if let Some(errors) = store.scripted_receive_failures.get_mut(&self.path) {
                    if !errors.is_empty() {
                        return Err(errors.remove(0));
                    }
                }
                if let Some(queue) = store.queues.get_mut(&self.path) {
                    if let Some(message) = queue.messages.pop_front() {
                        return Ok(Some(message));
                    }
                    if queue.closed {
                        return Ok(None);
                    }
                }
            }
            waiter.await;
        }
    }
}
