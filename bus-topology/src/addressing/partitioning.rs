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

//! Namespace partitioning strategy seam and the shipped strategies.

use crate::error::ConfigurationError;
use crate::namespaces::{NamespaceInfo, NamespacePurpose, NamespaceRegistry};

/// Chooses which namespace(s) host a logical destination.
///
/// Must return at least one namespace per purpose, deterministically for a
/// fixed configuration, so creation and pumping target the same physical
/// namespaces across calls and restarts.
pub trait PartitioningStrategy: Send + Sync {
    fn select_namespaces(&self, purpose: NamespacePurpose) -> Vec<NamespaceInfo>;
}

/// Hosts everything on the single default namespace.
#[derive(Clone, Debug)]
pub struct SingleNamespacePartitioning {
    namespace: NamespaceInfo,
}

impl SingleNamespacePartitioning {
    pub fn new(
        registry: &NamespaceRegistry,
        default_alias: &str,
    ) -> Result<Self, ConfigurationError> {
        let namespace = registry.get(default_alias).map_err(|err| {
            ConfigurationError::new(format!(
                "single-namespace partitioning requires the default namespace: {err}"
            ))
        })?;

        Ok(Self {
            namespace: namespace.clone(),
        })
    }
}

impl PartitioningStrategy for SingleNamespacePartitioning {
    fn select_namespaces(&self, _purpose: NamespacePurpose) -> Vec<NamespaceInfo> {
        vec![self.namespace.clone()]
    }
}

/// Fans each destination out to every namespace registered for the requested
/// purpose, in registration order.
#[derive(Clone, Debug)]
pub struct FanOutNamespacePartitioning {
    sending: Vec<NamespaceInfo>,
    receiving: Vec<NamespaceInfo>,
}

impl FanOutNamespacePartitioning {
    pub fn new(registry: &NamespaceRegistry) -> Result<Self, ConfigurationError> {
        let sending: Vec<NamespaceInfo> = registry
            .iter()
            .filter(|entry| entry.purpose == NamespacePurpose::Sending)
            .cloned()
            .collect();
        let receiving: Vec<NamespaceInfo> = registry
            .iter()
            .filter(|entry| entry.purpose == NamespacePurpose::Receiving)
            .cloned()
            .collect();

        if sending.is_empty() {
            return Err(ConfigurationError::new(
                "fan-out partitioning requires at least one namespace registered for sending",
            ));
        }
        if receiving.is_empty() {
            return Err(ConfigurationError::new(
                "fan-out partitioning requires at least one namespace registered for receiving",
            ));
        }

        Ok(Self { sending, receiving })
    }
}

impl PartitioningStrategy for FanOutNamespacePartitioning {
    fn select_namespaces(&self, purpose: NamespacePurpose) -> Vec<NamespaceInfo> {
        match purpose {
            NamespacePurpose::Sending => self.sending.clone(),
            NamespacePurpose::Receiving => self.receiving.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FanOutNamespacePartitioning, PartitioningStrategy, SingleNamespacePartitioning,
    };
    use crate::namespaces::{NamespacePurpose, NamespaceRegistry};

    fn registry_with_both_purposes() -> NamespaceRegistry {
        let mut registry = NamespaceRegistry::new();
        registry.add("send-a", "connection-a", NamespacePurpose::Sending);
        registry.add("send-b", "connection-b", NamespacePurpose::Sending);
        registry.add("recv-a", "connection-c", NamespacePurpose::Receiving);
        registry
    }

    #[test]
    fn single_partitioning_requires_the_default_alias() {
        let registry = registry_with_both_purposes();

        assert!(SingleNamespacePartitioning::new(&registry, "send-a").is_ok());
        assert!(SingleNamespacePartitioning::new(&registry, "missing").is_err());
    }

    #[test]
    fn single_partitioning_is_stable_across_purposes() {
        let registry = registry_with_both_purposes();
        let strategy = SingleNamespacePartitioning::new(&registry, "send-a").unwrap();

        let sending = strategy.select_namespaces(NamespacePurpose::Sending);
        let receiving = strategy.select_namespaces(NamespacePurpose::Receiving);

        assert_eq!(sending, receiving);
        assert_eq!(sending[0].alias, "send-a");
    }

    #[test]
    fn fan_out_returns_namespaces_in_registration_order() {
        let registry = registry_with_both_purposes();
        let strategy = FanOutNamespacePartitioning::new(&registry).unwrap();

        let aliases: Vec<String> = strategy
            .select_namespaces(NamespacePurpose::Sending)
            .into_iter()
            .map(|namespace| namespace.alias)
            .collect();

        assert_eq!(aliases, vec!["send-a", "send-b"]);
    }

    #[test]
    fn fan_out_rejects_registries_missing_a_purpose() {
        let mut registry = NamespaceRegistry::new();
        registry.add("send-only", "connection-a", NamespacePurpose::Sending);

        assert!(FanOutNamespacePartitioning::new(&registry).is_err());
    }
}
