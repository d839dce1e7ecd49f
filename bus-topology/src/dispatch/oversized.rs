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

//! Fallback seam for payloads exceeding the broker's message size limit.

use crate::messages::WireMessage;
use async_trait::async_trait;

/// Decision returned by the oversized-message handler.
#[derive(Clone, Debug)]
pub enum OversizedMessageOutcome {
    /// Send this substitute instead (for example a claim-check stub after the
    /// payload was offloaded elsewhere).
    Dispatch(WireMessage),
    /// Drop the message without failing the batch.
    Skip,
    /// Fail the dispatch with the given reason.
    Reject { reason: String },
}

/// Handles one over-limit message; the outcome is authoritative for whether
/// the send proceeds.
#[async_trait]
pub trait OversizedMessageHandler: Send + Sync {
    async fn handle(&self, message: WireMessage, size_limit: usize) -> OversizedMessageOutcome;
}

/// Default handler: refuses over-limit payloads outright.
pub struct RejectOversizedMessages;

#[async_trait]
impl OversizedMessageHandler for RejectOversizedMessages {
    async fn handle(&self, message: WireMessage, size_limit: usize) -> OversizedMessageOutcome {
        OversizedMessageOutcome::Reject {
            reason: format!(
                "message `{}` is {} bytes; the broker limit is {size_limit}",
                message.message_id,
                message.encoded_len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OversizedMessageHandler, OversizedMessageOutcome, RejectOversizedMessages};
    use crate::messages::{OutgoingMessage, WireMessage};

    #[tokio::test]
    async fn default_handler_rejects_with_sizes_in_the_reason() {
        let outgoing = OutgoingMessage::new("big-1", "orders", vec![0u8; 64]);
        let wire = WireMessage::from_outgoing(&outgoing, "orders");

        let outcome = RejectOversizedMessages.handle(wire, 32).await;

        match outcome {
            OversizedMessageOutcome::Reject { reason } => {
                assert!(reason.contains("big-1"));
                assert!(reason.contains("32"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
