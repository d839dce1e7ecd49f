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

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) endpoint: EndpointConfig,
    pub(crate) namespaces: Vec<NamespaceConfig>,
    pub(crate) addressing: AddressingConfig,
    #[serde(default)]
    pub(crate) bundle: BundleConfig,
    #[serde(default)]
    pub(crate) receive: ReceiveConfig,
    #[serde(default)]
    pub(crate) bindings: BindingsConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub(crate) local_address: String,
    pub(crate) max_concurrency: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct NamespaceConfig {
    pub(crate) alias: String,
    pub(crate) connection: String,
    pub(crate) purpose: PurposeTag,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PurposeTag {
    Sending,
    Receiving,
}

/// Strategy selectors resolved once at startup into typed strategy instances.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AddressingConfig {
    #[serde(default)]
    pub(crate) partitioning: PartitioningTag,
    #[serde(default)]
    pub(crate) composition: CompositionTag,
    #[serde(default = "default_max_path_length")]
    pub(crate) max_path_length: usize,
    #[serde(default = "default_namespace_alias")]
    pub(crate) default_namespace_alias: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartitioningTag {
    #[default]
    SingleNamespace,
    FanOut,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositionTag {
    #[default]
    Flat,
    Hierarchy,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    pub(crate) number_of_entities: usize,
    pub(crate) prefix: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            number_of_entities: 2,
            prefix: "bundle-".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReceiveConfig {
    pub(crate) mode: ReceiveModeTag,
    pub(crate) auto_renew_timeout_secs: u64,
    pub(crate) clients_per_entity: usize,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            mode: ReceiveModeTag::PeekLock,
            auto_renew_timeout_secs: 300,
            clients_per_entity: 2,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ReceiveModeTag {
    PeekLock,
    ReceiveAndDelete,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct BindingsConfig {
    #[serde(default)]
    pub(crate) receiving: Vec<String>,
    #[serde(default)]
    pub(crate) sending: Vec<String>,
}

fn default_max_path_length() -> usize {
    260
}

fn default_namespace_alias() -> String {
    "default".to_string()
}
