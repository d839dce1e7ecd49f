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

//! Outbound path: batching and routing of outgoing operations.

pub mod batch_router;
pub mod batcher;
pub mod oversized;

pub use batch_router::{DispatchError, OutgoingBatchRouter};
pub use batcher::{Batch, Batcher};
pub use oversized::{OversizedMessageHandler, OversizedMessageOutcome, RejectOversizedMessages};
