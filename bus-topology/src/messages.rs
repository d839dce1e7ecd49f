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

//! Message model shared by the receive and dispatch paths.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// One outgoing operation addressed to a logical destination.
#[derive(Clone, Debug)]
pub struct OutgoingMessage {
    pub message_id: String,
    /// Logical destination address, resolved to physical entities by the
    /// section manager before dispatch.
    pub destination: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl OutgoingMessage {
    pub fn new(message_id: impl Into<String>, destination: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            message_id: message_id.into(),
            destination: destination.into(),
            headers: HashMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Broker wire representation of one outgoing operation.
#[derive(Clone, Debug)]
pub struct WireMessage {
    /// Physical entity path the message is addressed to.
    pub path: String,
    pub message_id: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl WireMessage {
    pub fn from_outgoing(message: &OutgoingMessage, path: &str) -> Self {
        Self {
            path: path.to_string(),
            message_id: message.message_id.clone(),
            headers: message.headers.clone(),
            body: message.body.clone(),
        }
    }

    /// Approximate wire size used against the broker's message size limit.
    pub fn encoded_len(&self) -> usize {
        let header_len: usize = self
            .headers
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum();
        self.path.len() + self.message_id.len() + header_len + self.body.len()
    }
}

/// One received message as surfaced by a receive stream.
#[derive(Clone, Debug)]
pub struct IncomingMessageDetails {
    pub message_id: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub delivery_count: u32,
}

/// Where a message was received: the entity and namespace of its notifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReceiveContext {
    pub entity_path: String,
    pub namespace_alias: String,
}

/// Application-level failure raised by the incoming-message handler.
#[derive(Clone, Debug)]
pub struct ProcessingError {
    message: String,
}

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ProcessingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ProcessingError {}

/// Context handed to the processing-failure handler for one failed message.
#[derive(Clone, Debug)]
pub struct ErrorContext {
    pub message: IncomingMessageDetails,
    pub receive_context: ReceiveContext,
    pub error: ProcessingError,
    pub delivery_attempts: u32,
}

/// Authoritative outcome of the processing-failure handler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorHandleResult {
    /// The failure was absorbed (for example dead-lettered by the handler).
    Handled,
    /// The message should be redelivered by the broker.
    RetryRequired,
}

/// Whether a dispatch must be enlisted with the triggering receive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DispatchConsistency {
    /// Independent best-effort dispatch.
    #[default]
    Isolated,
    /// Dispatch bound to the unit of work of the triggering receive; requires
    /// a receive context.
    ReceiveBound,
}

#[cfg(test)]
mod tests {
    use super::{OutgoingMessage, WireMessage};

    #[test]
    fn encoded_len_accounts_for_path_headers_and_body() {
        let outgoing = OutgoingMessage::new("id-1", "orders", vec![0u8; 10])
            .with_header("content-type", "text/plain");
        let wire = WireMessage::from_outgoing(&outgoing, "orders-a");

        // path(8) + message_id(4) + header key(12) + header value(10) + body(10)
        assert_eq!(wire.encoded_len(), 44);
    }

    #[test]
    fn wire_message_preserves_logical_payload() {
        let outgoing = OutgoingMessage::new("id-2", "billing", b"payload".to_vec());
        let wire = WireMessage::from_outgoing(&outgoing, "billing-queue");

        assert_eq!(wire.path, "billing-queue");
        assert_eq!(wire.message_id, "id-2");
        assert_eq!(wire.body, b"payload");
    }
}
