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

//! Hosting-framework callback seams wired into notifiers by the operator.

use crate::broker::BrokerError;
use crate::messages::{ErrorContext, ErrorHandleResult, IncomingMessageDetails, ProcessingError, ReceiveContext};
use async_trait::async_trait;
use std::sync::Arc;

/// Handles each received message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn on_message(
        &self,
        message: IncomingMessageDetails,
        context: ReceiveContext,
    ) -> Result<(), ProcessingError>;
}

/// Handles recoverable receive-stream errors; the notifier keeps running.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn on_error(&self, error: BrokerError);
}

/// Handles unrecoverable notifier-level conditions; the notifier stops after
/// this fires and may escalate to process-level shutdown.
pub trait CriticalErrorHandler: Send + Sync {
    fn on_critical(&self, error: BrokerError);
}

/// Decides the outcome of one failed message handling attempt.
#[async_trait]
pub trait ProcessingFailureHandler: Send + Sync {
    async fn on_processing_failure(&self, context: ErrorContext) -> ErrorHandleResult;
}

/// Snapshot of the registered handlers.
///
/// The operator holds the live set; each notifier captures one snapshot at
/// initialization. Later handler registration is last-write-wins and not
/// guaranteed to reach already-initialized notifiers.
#[derive(Clone, Default)]
pub(crate) struct CallbackSet {
    pub(crate) on_message: Option<Arc<dyn MessageHandler>>,
    pub(crate) on_error: Option<Arc<dyn ErrorHandler>>,
    pub(crate) on_critical: Option<Arc<dyn CriticalErrorHandler>>,
    pub(crate) on_processing_failure: Option<Arc<dyn ProcessingFailureHandler>>,
}
