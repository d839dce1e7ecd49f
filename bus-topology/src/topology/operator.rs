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

//! Owns the receive side: tracks one notifier per listened entity and the
//! operator lifecycle around them.

use crate::broker::{BrokerClientProvider, BrokerError, EntityKind};
use crate::callbacks::{
    CallbackSet, CriticalErrorHandler, ErrorHandler, MessageHandler, ProcessingFailureHandler,
};
use crate::observability::events;
use crate::settings::ReceiveSettings;
use crate::topology::entities::{EntityInfo, EntityKey, TopologySection};
use crate::topology::notifier::{MessageNotifier, NotifierLifecycleError, UnsupportedEntityType};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info};

const COMPONENT: &str = "topology_operator";

/// Operator lifecycle and subscription-management failures.
#[derive(Debug)]
pub enum OperatorError {
    /// `start` was called while already running.
    AlreadyRunning,
    /// The operator was stopped; stopped operators are never restarted.
    Stopped,
    /// A listened entity has a kind no notifier can be built for.
    UnsupportedEntityType(UnsupportedEntityType),
    /// No broker client could be resolved for an entity's namespace.
    ClientUnavailable { alias: String, source: BrokerError },
    NotifierLifecycle(NotifierLifecycleError),
}

impl Display for OperatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::AlreadyRunning => write!(f, "operator is already running"),
            OperatorError::Stopped => write!(f, "operator has been stopped"),
            OperatorError::UnsupportedEntityType(source) => Display::fmt(source, f),
            OperatorError::ClientUnavailable { alias, source } => {
                write!(f, "no broker client for namespace `{alias}`: {source}")
            }
            OperatorError::NotifierLifecycle(source) => Display::fmt(source, f),
        }
    }
}

impl Error for OperatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OperatorError::UnsupportedEntityType(source) => Some(source),
            OperatorError::ClientUnavailable { source, .. } => Some(source),
            OperatorError::NotifierLifecycle(source) => Some(source),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OperatorPhase {
    Created,
    Running,
    Stopped,
}

/// Everything the lifecycle lock guards. Pending starts replay in the order
/// they were buffered.
struct OperatorCore {
    phase: OperatorPhase,
    limiter: Option<Arc<Semaphore>>,
    pending_starts: Vec<Vec<EntityInfo>>,
    notifiers: HashMap<EntityKey, Arc<MessageNotifier>>,
}

/// Lifecycle coordinator for all receive loops of the endpoint.
///
/// Subscriptions requested before `start` are buffered and replayed on start;
/// after `stop` the operator refuses further work instead of reviving.
pub struct TopologyOperator {
    clients: Arc<dyn BrokerClientProvider>,
    receive: ReceiveSettings,
    callbacks: ArcSwap<CallbackSet>,
    core: Mutex<OperatorCore>,
}

impl TopologyOperator {
    pub fn new(clients: Arc<dyn BrokerClientProvider>, receive: ReceiveSettings) -> Self {
        Self {
            clients,
            receive,
            callbacks: ArcSwap::from_pointee(CallbackSet::default()),
            core: Mutex::new(OperatorCore {
                phase: OperatorPhase::Created,
                limiter: None,
                pending_starts: Vec::new(),
                notifiers: HashMap::new(),
            }),
        }
    }

    /// Registers the incoming-message handler. Last write wins; notifiers
    /// started earlier keep the snapshot they were wired with.
    pub fn on_incoming_message(&self, handler: Arc<dyn MessageHandler>) {
        self.update_callbacks(|set| set.on_message = Some(handler));
    }

    /// Registers the recoverable-error handler. Last write wins.
    pub fn on_error(&self, handler: Arc<dyn ErrorHandler>) {
        self.update_callbacks(|set| set.on_error = Some(handler));
    }

    /// Registers the critical-error handler. Last write wins.
    pub fn on_critical_error(&self, handler: Arc<dyn CriticalErrorHandler>) {
        self.update_callbacks(|set| set.on_critical = Some(handler));
    }

    /// Registers the processing-failure handler. Last write wins.
    pub fn on_processing_failure(&self, handler: Arc<dyn ProcessingFailureHandler>) {
        self.update_callbacks(|set| set.on_processing_failure = Some(handler));
    }

    fn update_callbacks(&self, apply: impl FnOnce(&mut CallbackSet)) {
        let mut set = CallbackSet::clone(&self.callbacks.load());
        apply(&mut set);
        self.callbacks.store(Arc::new(set));
    }

    /// Transitions to running, starts a notifier for every listened entity of
    /// `section` under the shared `max_concurrency` budget, then replays
    /// buffered subscription requests in the order they arrived.
    pub async fn start(
        &self,
        section: &TopologySection,
        max_concurrency: usize,
    ) -> Result<(), OperatorError> {
        let mut core = self.core.lock().await;
        match core.phase {
            OperatorPhase::Running => return Err(OperatorError::AlreadyRunning),
            OperatorPhase::Stopped => return Err(OperatorError::Stopped),
            OperatorPhase::Created => {}
        }

        let max_concurrency = max_concurrency.max(1);
        core.limiter = Some(Arc::new(Semaphore::new(max_concurrency)));
        core.phase = OperatorPhase::Running;

        self.start_entities(&mut core, section.entities().to_vec())
            .await?;

        let pending = std::mem::take(&mut core.pending_starts);
        let replayed = pending.len();
        for entities in pending {
            debug!(
                event = events::OPERATOR_PENDING_REPLAY,
                component = COMPONENT,
                entities = entities.len(),
                "replaying a buffered subscription request"
            );
            self.start_entities(&mut core, entities).await?;
        }

        info!(
            event = events::OPERATOR_START,
            component = COMPONENT,
            replayed_requests = replayed,
            max_concurrency,
            "operator started"
        );
        Ok(())
    }

    /// Starts notifiers for the listened entities of `entities`. Requests
    /// arriving before `start` are buffered; requests after `stop` fail.
    pub async fn start_subscriptions(
        &self,
        entities: Vec<EntityInfo>,
    ) -> Result<(), OperatorError> {
        let mut core = self.core.lock().await;
        match core.phase {
            OperatorPhase::Stopped => Err(OperatorError::Stopped),
            OperatorPhase::Created => {
                debug!(
                    event = events::OPERATOR_PENDING_BUFFERED,
                    component = COMPONENT,
                    entities = entities.len(),
                    "operator not started; buffering subscription request"
                );
                core.pending_starts.push(entities);
                Ok(())
            }
            OperatorPhase::Running => self.start_entities(&mut core, entities).await,
        }
    }

    /// Stops and discards the notifiers for the listened entities of
    /// `entities`. A later `start_subscriptions` for the same entity builds a
    /// fresh notifier.
    pub async fn stop_subscriptions(
        &self,
        entities: &[EntityInfo],
    ) -> Result<(), OperatorError> {
        let mut core = self.core.lock().await;
        if core.phase == OperatorPhase::Stopped {
            return Err(OperatorError::Stopped);
        }

        for entity in entities.iter().filter(|entity| entity.should_be_listened_to) {
            let key = entity.key();
            if core.phase == OperatorPhase::Created {
                for pending in &mut core.pending_starts {
                    pending.retain(|candidate| candidate.key() != key);
                }
            }
            if let Some(notifier) = core.notifiers.remove(&key) {
                notifier.stop().await;
            }
        }
        Ok(())
    }

    /// Stops every notifier and refuses further work. Waits for all receive
    /// loops, so no handler callback resolves after this returns. Idempotent.
    pub async fn stop(&self) {
        let mut core = self.core.lock().await;
        if core.phase == OperatorPhase::Stopped {
            return;
        }

        // Wake any receive loop blocked on the shared budget.
        if let Some(limiter) = core.limiter.take() {
            limiter.close();
        }

        let stopped = core.notifiers.len();
        for (_, notifier) in core.notifiers.drain() {
            notifier.stop().await;
        }
        core.pending_starts.clear();
        core.phase = OperatorPhase::Stopped;

        info!(
            event = events::OPERATOR_STOP,
            component = COMPONENT,
            notifiers = stopped,
            "operator stopped"
        );
    }

    async fn start_entities(
        &self,
        core: &mut OperatorCore,
        entities: Vec<EntityInfo>,
    ) -> Result<(), OperatorError> {
        let listened: Vec<EntityInfo> = entities
            .into_iter()
            .filter(|entity| entity.should_be_listened_to)
            .collect();

        // Validate the whole batch before any notifier spawns.
        if let Some(entity) = listened
            .iter()
            .find(|entity| !matches!(entity.kind, EntityKind::Queue | EntityKind::Subscription))
        {
            return Err(OperatorError::UnsupportedEntityType(UnsupportedEntityType {
                kind: entity.kind,
            }));
        }

        let limiter = match core.limiter.as_ref() {
            Some(limiter) => limiter.clone(),
            // Unreachable while running; kept total rather than panicking.
            None => Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
        };

        for entity in listened {
            let key = entity.key();
            if !core.notifiers.contains_key(&key) {
                let client = self.clients.client_for(&entity.namespace).await.map_err(
                    |source| OperatorError::ClientUnavailable {
                        alias: entity.namespace.alias.clone(),
                        source,
                    },
                )?;

                let mut notifier =
                    MessageNotifier::new(entity.clone(), client, self.receive.clone())
                        .map_err(OperatorError::UnsupportedEntityType)?;
                notifier.initialize(
                    CallbackSet::clone(&self.callbacks.load()),
                    limiter.clone(),
                );
                core.notifiers.insert(key.clone(), Arc::new(notifier));
            }

            if let Some(notifier) = core.notifiers.get(&key) {
                notifier
                    .start()
                    .await
                    .map_err(OperatorError::NotifierLifecycle)?;
            }
        }
        Ok(())
    }
}
