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

//! Broker client seam: traits consumed by the engine and the tagged error type
//! returned at the broker boundary.

use crate::messages::{IncomingMessageDetails, WireMessage};
use crate::namespaces::NamespaceInfo;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Broker-managed addressable resource kinds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntityKind {
    Queue,
    Topic,
    Subscription,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Queue => write!(f, "queue"),
            EntityKind::Topic => write!(f, "topic"),
            EntityKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// Failure classification assigned where the broker client surfaces an error,
/// not inferred later by unwinding a cause chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BrokerErrorKind {
    /// Worth retrying under a bounded retry policy.
    Transient,
    /// Propagates immediately; retrying cannot help.
    Permanent,
    /// The entity being created already exists on the broker.
    AlreadyExists,
    /// The addressed entity does not exist on the broker.
    NotFound,
}

/// Error value crossing the broker client boundary.
#[derive(Clone, Debug)]
pub struct BrokerError {
    kind: BrokerErrorKind,
    message: String,
}

impl BrokerError {
    pub fn new(kind: BrokerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(BrokerErrorKind::Transient, message)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(BrokerErrorKind::Permanent, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(BrokerErrorKind::AlreadyExists, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BrokerErrorKind::NotFound, message)
    }

    pub fn kind(&self) -> BrokerErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creation-time retry classification: transient failures and the
    /// already-exists condition both count as recoverable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            BrokerErrorKind::Transient | BrokerErrorKind::AlreadyExists
        )
    }
}

impl Display for BrokerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.message, self.kind)
    }
}

impl Error for BrokerError {}

/// Open send handle bound to one namespace connection.
#[async_trait]
pub trait BrokerSender: Send + Sync {
    async fn send(&self, message: WireMessage) -> Result<(), BrokerError>;
}

/// Open receive stream bound to one entity.
///
/// `next_message` resolves to `Ok(None)` when the broker closes the stream.
#[async_trait]
pub trait ReceiveStream: Send {
    async fn next_message(&mut self) -> Result<Option<IncomingMessageDetails>, BrokerError>;
}

/// Raw broker client capability for one namespace, assumed external.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn create_entity(&self, path: &str, kind: EntityKind) -> Result<(), BrokerError>;

    async fn entity_exists(&self, path: &str) -> Result<bool, BrokerError>;

    /// Pre-flight capability check: whether the configured credentials may
    /// manage topology on this namespace.
    async fn can_manage_entities(&self) -> Result<bool, BrokerError>;

    async fn open_sender(&self) -> Result<Arc<dyn BrokerSender>, BrokerError>;

    async fn open_receiver(
        &self,
        path: &str,
        kind: EntityKind,
    ) -> Result<Box<dyn ReceiveStream>, BrokerError>;

    /// Largest wire message the broker accepts, in bytes.
    fn message_size_limit(&self) -> usize;
}

/// Maps a registered namespace to its broker client.
#[async_trait]
pub trait BrokerClientProvider: Send + Sync {
    async fn client_for(
        &self,
        namespace: &NamespaceInfo,
    ) -> Result<Arc<dyn BrokerClient>, BrokerError>;
}
