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

//! Addressing: pluggable path sanitization, composition and partitioning.

mod composition;
mod partitioning;
mod sanitization;

pub use composition::{CompositionStrategy, FlatComposition, HierarchyComposition};
pub use partitioning::{
    FanOutNamespacePartitioning, PartitioningStrategy, SingleNamespacePartitioning,
};
pub use sanitization::{SanitizationStrategy, StandardSanitization};

use std::sync::Arc;

/// Pure composition of the two addressing strategies: sanitizes every input
/// component, then composes, never reordering or mutating inputs.
#[derive(Clone)]
pub struct AddressingLogic {
    sanitization: Arc<dyn SanitizationStrategy>,
    composition: Arc<dyn CompositionStrategy>,
}

impl AddressingLogic {
    pub fn new(
        sanitization: Arc<dyn SanitizationStrategy>,
        composition: Arc<dyn CompositionStrategy>,
    ) -> Self {
        Self {
            sanitization,
            composition,
        }
    }

    /// Builds a legal entity path from raw logical components.
    pub fn apply(&self, parts: &[&str]) -> String {
        let sanitized: Vec<String> = parts
            .iter()
            .map(|part| self.sanitization.sanitize(part))
            .collect();
        let sanitized_refs: Vec<&str> = sanitized.iter().map(String::as_str).collect();

        self.composition.compose(&sanitized_refs)
    }

    /// Sanitizes a single raw component without composition.
    pub fn legalize(&self, raw_path: &str) -> String {
        self.sanitization.sanitize(raw_path)
    }
}
