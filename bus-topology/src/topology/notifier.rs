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

//! Per-entity receive loops ("notifiers") driven by the operator.

use crate::broker::{BrokerClient, BrokerError, BrokerErrorKind, EntityKind};
use crate::callbacks::CallbackSet;
use crate::messages::{ErrorContext, ErrorHandleResult, IncomingMessageDetails, ProcessingError, ReceiveContext};
use crate::observability::{events, fields};
use crate::settings::{ReceiveMode, ReceiveSettings};
use crate::topology::entities::EntityInfo;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "message_notifier";

/// A non-receivable entity kind was passed to notifier creation.
#[derive(Clone, Debug)]
pub struct UnsupportedEntityType {
    pub kind: EntityKind,
}

impl Display for UnsupportedEntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "entity type `{}` cannot be listened to", self.kind)
    }
}

impl Error for UnsupportedEntityType {}

/// Lifecycle misuse detected at start time.
#[derive(Clone, Debug)]
pub enum NotifierLifecycleError {
    NotInitialized,
    Resurrected,
}

impl Display for NotifierLifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NotifierLifecycleError::NotInitialized => {
                write!(f, "notifier started before callbacks were wired")
            }
            NotifierLifecycleError::Resurrected => {
                write!(f, "stopped notifiers are never restarted")
            }
        }
    }
}

impl Error for NotifierLifecycleError {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum NotifierPhase {
    Created,
    Started,
    Stopped,
}

/// Wired exactly once by `initialize`.
struct NotifierRuntime {
    callbacks: Arc<CallbackSet>,
    limiter: Arc<Semaphore>,
}

struct NotifierRunState {
    phase: NotifierPhase,
    shutdown: Option<watch::Sender<bool>>,
    loops: Vec<JoinHandle<()>>,
}

/// One running receive-loop owner for one entity.
///
/// Lifecycle is Created -> Started -> Stopped and one-way; the operator maps
/// a fresh entity key to a fresh notifier instead of restarting this one.
pub(crate) struct MessageNotifier {
    notifier_id: String,
    entity: EntityInfo,
    client: Arc<dyn BrokerClient>,
    receive: ReceiveSettings,
    runtime: Option<NotifierRuntime>,
    state: Mutex<NotifierRunState>,
}

impl MessageNotifier {
    /// Fails fast for entity kinds that cannot carry a receive stream.
    pub(crate) fn new(
        entity: EntityInfo,
        client: Arc<dyn BrokerClient>,
        receive: ReceiveSettings,
    ) -> Result<Self, UnsupportedEntityType> {
        if !matches!(entity.kind, EntityKind::Queue | EntityKind::Subscription) {
            return Err(UnsupportedEntityType { kind: entity.kind });
        }

        Ok(Self {
            notifier_id: Uuid::new_v4().to_string(),
            entity,
            client,
            receive,
            runtime: None,
            state: Mutex::new(NotifierRunState {
                phase: NotifierPhase::Created,
                shutdown: None,
                loops: Vec::new(),
            }),
        })
    }

    /// Wires the callback snapshot and the shared receive budget. Only the
    /// first call has effect.
    pub(crate) fn initialize(&mut self, callbacks: CallbackSet, limiter: Arc<Semaphore>) {
        if self.runtime.is_some() {
            warn!(
                component = COMPONENT,
                notifier_id = self.notifier_id.as_str(),
                "notifier already initialized; keeping the original wiring"
            );
            return;
        }

        self.runtime = Some(NotifierRuntime {
            callbacks: Arc::new(callbacks),
            limiter,
        });
    }

    pub(crate) fn entity(&self) -> &EntityInfo {
        &self.entity
    }

    /// Spawns the configured number of receive loops. Idempotent while
    /// started; stopped notifiers cannot come back.
    pub(crate) async fn start(&self) -> Result<(), NotifierLifecycleError> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or(NotifierLifecycleError::NotInitialized)?;

        let mut state = self.state.lock().await;
        match state.phase {
            NotifierPhase::Started => return Ok(()),
            NotifierPhase::Stopped => return Err(NotifierLifecycleError::Resurrected),
            NotifierPhase::Created => {}
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let loop_count = self.receive.clients_per_entity.max(1);

        for loop_index in 0..loop_count {
            let loop_state = ReceiveLoop {
                loop_id: format!("{}-{loop_index}", self.notifier_id),
                entity: self.entity.clone(),
                client: self.client.clone(),
                receive: self.receive.clone(),
                callbacks: runtime.callbacks.clone(),
                limiter: runtime.limiter.clone(),
                shutdown: shutdown_rx.clone(),
            };
            state.loops.push(tokio::spawn(loop_state.run()));
        }

        state.shutdown = Some(shutdown_tx);
        state.phase = NotifierPhase::Started;

        info!(
            event = events::NOTIFIER_START,
            component = COMPONENT,
            notifier_id = self.notifier_id.as_str(),
            entity = %fields::format_entity(&self.entity),
            loops = loop_count,
            "notifier started"
        );
        Ok(())
    }

    /// Stops all receive loops and waits for them to finish, so no message
    /// callback fires for this entity after this resolves.
    pub(crate) async fn stop(&self) {
        let mut state = self.state.lock().await;
        if state.phase == NotifierPhase::Stopped {
            return;
        }

        if let Some(shutdown) = state.shutdown.take() {
            let _ = shutdown.send(true);
        }
        for handle in state.loops.drain(..) {
            let _ = handle.await;
        }

        state.phase = NotifierPhase::Stopped;
        info!(
            event = events::NOTIFIER_STOP,
            component = COMPONENT,
            notifier_id = self.notifier_id.as_str(),
            entity = %fields::format_entity(&self.entity),
            "notifier stopped"
        );
    }
}

struct ReceiveLoop {
    loop_id: String,
    entity: EntityInfo,
    client: Arc<dyn BrokerClient>,
    receive: ReceiveSettings,
    callbacks: Arc<CallbackSet>,
    limiter: Arc<Semaphore>,
    shutdown: watch::Receiver<bool>,
}

impl ReceiveLoop {
    async fn run(mut self) {
        let receive_context = ReceiveContext {
            entity_path: self.entity.path.clone(),
            namespace_alias: self.entity.namespace.alias.clone(),
        };

        let mut stream = match self
            .client
            .open_receiver(&self.entity.path, self.entity.kind)
            .await
        {
            Ok(stream) => stream,
            Err(error) => {
                self.escalate_critical(error);
                return;
            }
        };

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => break,
                next = stream.next_message() => match next {
                    Ok(Some(message)) => {
                        // The receive budget is shared across all notifiers;
                        // acquisition blocks further dispatch, never rejects.
                        let permit = tokio::select! {
                            _ = self.shutdown.changed() => break,
                            permit = self.limiter.acquire() => match permit {
                                Ok(permit) => permit,
                                Err(_) => break,
                            },
                        };
                        self.dispatch(message, &receive_context).await;
                        drop(permit);
                    }
                    Ok(None) => {
                        info!(
                            event = events::NOTIFIER_STREAM_CLOSED,
                            component = COMPONENT,
                            loop_id = self.loop_id.as_str(),
                            entity = %self.entity.key(),
                            "receive stream closed by the broker"
                        );
                        break;
                    }
                    Err(error) if error.kind() == BrokerErrorKind::Transient => {
                        warn!(
                            event = events::NOTIFIER_TRANSIENT_ERROR,
                            component = COMPONENT,
                            loop_id = self.loop_id.as_str(),
                            entity = %self.entity.key(),
                            err = %error,
                            "transient receive failure"
                        );
                        if let Some(on_error) = self.callbacks.on_error.as_ref() {
                            on_error.on_error(error).await;
                        }
                    }
                    Err(error) => {
                        self.escalate_critical(error);
                        break;
                    }
                }
            }
        }
    }

    async fn dispatch(&self, message: IncomingMessageDetails, receive_context: &ReceiveContext) {
        let Some(handler) = self.callbacks.on_message.as_ref() else {
            debug!(
                component = COMPONENT,
                loop_id = self.loop_id.as_str(),
                "no incoming-message handler registered; dropping message"
            );
            return;
        };

        let attempt = handler.on_message(message.clone(), receive_context.clone());
        let result = match self.receive.mode {
            // Under peek-lock the handler must finish inside the lock
            // auto-renew window.
            ReceiveMode::PeekLock => {
                match tokio::time::timeout(self.receive.auto_renew_timeout, attempt).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            event = events::NOTIFIER_HANDLER_TIMEOUT,
                            component = COMPONENT,
                            loop_id = self.loop_id.as_str(),
                            entity = %self.entity.key(),
                            message_id = message.message_id.as_str(),
                            "handler exceeded the auto-renew timeout"
                        );
                        Err(ProcessingError::new("handler exceeded the auto-renew timeout"))
                    }
                }
            }
            ReceiveMode::ReceiveAndDelete => attempt.await,
        };

        // Per-message failures are isolated; they never crash the notifier.
        if let Err(error) = result {
            let delivery_attempts = message.delivery_count;
            let outcome = match self.callbacks.on_processing_failure.as_ref() {
                Some(failure_handler) => {
                    failure_handler
                        .on_processing_failure(ErrorContext {
                            message,
                            receive_context: receive_context.clone(),
                            error,
                            delivery_attempts,
                        })
                        .await
                }
                None => ErrorHandleResult::Handled,
            };

            match outcome {
                ErrorHandleResult::Handled => debug!(
                    event = events::PROCESSING_FAILURE_HANDLED,
                    component = COMPONENT,
                    loop_id = self.loop_id.as_str(),
                    "processing failure absorbed by the failure handler"
                ),
                ErrorHandleResult::RetryRequired => debug!(
                    event = events::PROCESSING_FAILURE_RETRY,
                    component = COMPONENT,
                    loop_id = self.loop_id.as_str(),
                    "redelivery requested; the broker owns redelivery"
                ),
            }
        }
    }

    fn escalate_critical(&self, error: BrokerError) {
        warn!(
            event = events::NOTIFIER_CRITICAL,
            component = COMPONENT,
            loop_id = self.loop_id.as_str(),
            entity = %self.entity.key(),
            err = %error,
            "unrecoverable receive failure; stopping this loop"
        );
        if let Some(on_critical) = self.callbacks.on_critical.as_ref() {
            on_critical.on_critical(error);
        }
    }
}
