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

//! Idempotent topology assertion against remote brokers.

use crate::broker::{BrokerClient, BrokerClientProvider, BrokerError, BrokerErrorKind};
use crate::namespaces::{NamespaceInfo, NamespaceRegistry};
use crate::observability::{events, fields};
use crate::topology::entities::{EntityInfo, TopologySection};
use futures::future::try_join_all;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const COMPONENT: &str = "topology_creator";

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(5);

/// Bounded exponential backoff applied to transient creation failures.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        (self.base_delay * factor).min(MAX_BACKOFF_DELAY)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}

/// Topology creation failures, all fatal to startup.
#[derive(Debug)]
pub enum TopologyCreateError {
    /// The configured credentials cannot manage topology on a namespace.
    ManageRightsDenied { alias: String },
    /// No broker client could be resolved for a namespace.
    ClientUnavailable { alias: String, source: BrokerError },
    /// A permanent failure while creating one entity.
    EntityCreation { path: String, source: BrokerError },
    /// Transient failures outlasted the retry policy.
    RetriesExhausted { path: String, source: BrokerError },
}

impl Display for TopologyCreateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TopologyCreateError::ManageRightsDenied { alias } => {
                write!(f, "credentials for namespace `{alias}` cannot manage topology")
            }
            TopologyCreateError::ClientUnavailable { alias, source } => {
                write!(f, "no broker client available for namespace `{alias}`: {source}")
            }
            TopologyCreateError::EntityCreation { path, source } => {
                write!(f, "failed to create entity `{path}`: {source}")
            }
            TopologyCreateError::RetriesExhausted { path, source } => {
                write!(f, "retries exhausted creating entity `{path}`: {source}")
            }
        }
    }
}

impl Error for TopologyCreateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TopologyCreateError::ManageRightsDenied { .. } => None,
            TopologyCreateError::ClientUnavailable { source, .. }
            | TopologyCreateError::EntityCreation { source, .. }
            | TopologyCreateError::RetriesExhausted { source, .. } => Some(source),
        }
    }
}

/// Asserts that the entities of a section exist on their brokers.
///
/// Creation is idempotent: an already-exists report is success. Entities
/// sharing a namespace are created sequentially to keep retries from
/// exhausting the client's connection pool; distinct namespaces proceed
/// concurrently.
pub struct TopologyCreator {
    clients: Arc<dyn BrokerClientProvider>,
    retry: RetryPolicy,
}

impl TopologyCreator {
    pub fn new(clients: Arc<dyn BrokerClientProvider>, retry: RetryPolicy) -> Self {
        Self { clients, retry }
    }

    /// Pre-flight capability check across all registered namespaces; fails
    /// fast before any creation is attempted.
    pub async fn assert_managed_rights(
        &self,
        registry: &NamespaceRegistry,
    ) -> Result<(), TopologyCreateError> {
        for namespace in registry.iter() {
            let client = self.client_for(namespace).await?;
            let can_manage = client.can_manage_entities().await.map_err(|source| {
                TopologyCreateError::ClientUnavailable {
                    alias: namespace.alias.clone(),
                    source,
                }
            })?;

            if !can_manage {
                warn!(
                    event = events::MANAGE_RIGHTS_DENIED,
                    component = COMPONENT,
                    alias = namespace.alias.as_str(),
                    "namespace credentials cannot manage topology"
                );
                return Err(TopologyCreateError::ManageRightsDenied {
                    alias: namespace.alias.clone(),
                });
            }

            debug!(
                event = events::MANAGE_RIGHTS_OK,
                component = COMPONENT,
                alias = namespace.alias.as_str(),
                "namespace credentials can manage topology"
            );
        }

        Ok(())
    }

    /// Asserts every entity of the section, propagating the first permanent
    /// failure and aborting the remaining batch.
    pub async fn create(&self, section: &TopologySection) -> Result<(), TopologyCreateError> {
        let groups = group_by_namespace(section.entities());

        try_join_all(
            groups
                .into_iter()
                .map(|(namespace, entities)| self.create_for_namespace(namespace, entities)),
        )
        .await?;

        Ok(())
    }

    async fn create_for_namespace(
        &self,
        namespace: NamespaceInfo,
        entities: Vec<EntityInfo>,
    ) -> Result<(), TopologyCreateError> {
        let client = self.client_for(&namespace).await?;

        for entity in entities {
            self.create_entity(client.as_ref(), &entity).await?;
        }

        Ok(())
    }

    async fn create_entity(
        &self,
        client: &dyn BrokerClient,
        entity: &EntityInfo,
    ) -> Result<(), TopologyCreateError> {
        let entity_field = fields::format_entity(entity);
        let mut attempt = 1u32;

        loop {
            match client.create_entity(&entity.path, entity.kind).await {
                Ok(()) => {
                    debug!(
                        event = events::ENTITY_CREATE_OK,
                        component = COMPONENT,
                        entity = entity_field.as_str(),
                        kind = %entity.kind,
                        "entity created"
                    );
                    return Ok(());
                }
                Err(error) if error.kind() == BrokerErrorKind::AlreadyExists => {
                    // Satisfied by a concurrent or previous creation.
                    debug!(
                        event = events::ENTITY_CREATE_ALREADY_EXISTS,
                        component = COMPONENT,
                        entity = entity_field.as_str(),
                        "entity already exists"
                    );
                    return Ok(());
                }
                Err(error)
                    if error.kind() == BrokerErrorKind::Transient
                        && attempt < self.retry.max_attempts =>
                {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        event = events::ENTITY_CREATE_RETRY,
                        component = COMPONENT,
                        entity = entity_field.as_str(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        err = %error,
                        "transient failure creating entity; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) if error.kind() == BrokerErrorKind::Transient => {
                    warn!(
                        event = events::ENTITY_CREATE_FAILED,
                        component = COMPONENT,
                        entity = entity_field.as_str(),
                        attempts = attempt,
                        err = %error,
                        "retries exhausted creating entity"
                    );
                    return Err(TopologyCreateError::RetriesExhausted {
                        path: entity.path.clone(),
                        source: error,
                    });
                }
                Err(error) => {
                    warn!(
                        event = events::ENTITY_CREATE_FAILED,
                        component = COMPONENT,
                        entity = entity_field.as_str(),
                        err = %error,
                        "permanent failure creating entity"
                    );
                    return Err(TopologyCreateError::EntityCreation {
                        path: entity.path.clone(),
                        source: error,
                    });
                }
            }
        }
    }

    async fn client_for(
        &self,
        namespace: &NamespaceInfo,
    ) -> Result<Arc<dyn BrokerClient>, TopologyCreateError> {
        self.clients.client_for(namespace).await.map_err(|source| {
            TopologyCreateError::ClientUnavailable {
                alias: namespace.alias.clone(),
                source,
            }
        })
    }
}

fn group_by_namespace(entities: &[EntityInfo]) -> Vec<(NamespaceInfo, Vec<EntityInfo>)> {
    let mut groups: Vec<(NamespaceInfo, Vec<EntityInfo>)> = Vec::new();

    for entity in entities {
        match groups
            .iter_mut()
            .find(|(namespace, _)| namespace.alias.eq_ignore_ascii_case(&entity.namespace.alias))
        {
            Some((_, group)) => group.push(entity.clone()),
            None => groups.push((entity.namespace.clone(), vec![entity.clone()])),
        }
    }

    groups
}
