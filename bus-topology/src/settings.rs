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

//! Read-once engine configuration surface.

use std::time::Duration;

const DEFAULT_NAMESPACE_ALIAS: &str = "default";
const DEFAULT_ENTITIES_IN_BUNDLE: usize = 2;
const DEFAULT_BUNDLE_PREFIX: &str = "bundle-";
const DEFAULT_AUTO_RENEW_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_CLIENTS_PER_ENTITY: usize = 2;

/// How receive loops settle messages with the broker.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReceiveMode {
    /// Messages are locked during handling; handler duration is bounded by
    /// the auto-renew timeout.
    #[default]
    PeekLock,
    /// Messages are settled on receipt.
    ReceiveAndDelete,
}

/// Controls how many logical queues fold into one physical bundled entity.
#[derive(Clone, Debug)]
pub struct BundleSettings {
    pub number_of_entities: usize,
    pub prefix: String,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            number_of_entities: DEFAULT_ENTITIES_IN_BUNDLE,
            prefix: DEFAULT_BUNDLE_PREFIX.to_string(),
        }
    }
}

/// Per-notifier receive-loop configuration.
#[derive(Clone, Debug)]
pub struct ReceiveSettings {
    pub mode: ReceiveMode,
    pub auto_renew_timeout: Duration,
    pub clients_per_entity: usize,
}

impl Default for ReceiveSettings {
    fn default() -> Self {
        Self {
            mode: ReceiveMode::default(),
            auto_renew_timeout: DEFAULT_AUTO_RENEW_TIMEOUT,
            clients_per_entity: DEFAULT_CLIENTS_PER_ENTITY,
        }
    }
}

/// Engine settings, read once while the dependency graph is wired; later
/// mutation is unsupported.
#[derive(Clone, Debug)]
pub struct TopologySettings {
    pub default_namespace_alias: String,
    pub bundle: BundleSettings,
    pub receive: ReceiveSettings,
}

impl Default for TopologySettings {
    fn default() -> Self {
        Self {
            default_namespace_alias: DEFAULT_NAMESPACE_ALIAS.to_string(),
            bundle: BundleSettings::default(),
            receive: ReceiveSettings::default(),
        }
    }
}
