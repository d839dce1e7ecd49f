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

//! Groups outgoing operations into per-destination batches.

use crate::messages::OutgoingMessage;
use crate::topology::entities::{EntityInfo, EntityKey};
use crate::topology::section_manager::TopologySectionManager;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered operations bound for one physical destination. Built per dispatch
/// call and consumed exactly once by the router.
#[derive(Clone, Debug)]
pub struct Batch {
    pub destination: EntityInfo,
    pub operations: Vec<OutgoingMessage>,
}

/// Resolves logical destinations and groups operations purely by destination
/// key, preserving the relative order of operations sharing a destination.
pub struct Batcher {
    sections: Arc<TopologySectionManager>,
}

impl Batcher {
    pub fn new(sections: Arc<TopologySectionManager>) -> Self {
        Self { sections }
    }

    /// One logical operation lands in every batch its partitioning fans out
    /// to; batches appear in first-use order.
    pub fn batch(&self, operations: Vec<OutgoingMessage>) -> Vec<Batch> {
        let mut batches: Vec<Batch> = Vec::new();
        let mut slots: HashMap<EntityKey, usize> = HashMap::new();

        for operation in operations {
            for destination in self
                .sections
                .determine_send_destinations(&operation.destination)
            {
                let slot = *slots.entry(destination.key()).or_insert_with(|| {
                    batches.push(Batch {
                        destination,
                        operations: Vec::new(),
                    });
                    batches.len() - 1
                });
                batches[slot].operations.push(operation.clone());
            }
        }

        batches
    }
}
