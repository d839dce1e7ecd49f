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

//! Namespace registry: alias-to-connection mappings with lenient dedupe.

use crate::observability::events;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use tracing::info;

const COMPONENT: &str = "namespace_registry";

/// What a registered namespace is used for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NamespacePurpose {
    Sending,
    Receiving,
}

/// One registered namespace: an isolated broker connection scope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamespaceInfo {
    pub alias: String,
    pub connection: String,
    pub purpose: NamespacePurpose,
}

impl NamespaceInfo {
    pub fn new(alias: &str, connection: &str, purpose: NamespacePurpose) -> Self {
        Self {
            alias: alias.to_string(),
            connection: connection.to_string(),
            purpose,
        }
    }
}

/// Lookup failure for an alias that was never registered.
#[derive(Clone, Debug)]
pub struct NamespaceNotFound {
    alias: String,
}

impl NamespaceNotFound {
    fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
        }
    }
}

impl Display for NamespaceNotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "namespace with alias `{}` has not been registered", self.alias)
    }
}

impl Error for NamespaceNotFound {}

/// Registry of namespace configurations, read-only once setup completes.
///
/// Duplicate registrations by connection or by alias (case-insensitive) are
/// tolerated: logged and skipped, never an error.
#[derive(Clone, Debug, Default)]
pub struct NamespaceRegistry {
    entries: Vec<NamespaceInfo>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a namespace unless its connection or alias is already taken.
    pub fn add(&mut self, alias: &str, connection: &str, purpose: NamespacePurpose) {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|entry| entry.connection == connection)
        {
            info!(
                event = events::REGISTRY_DUPLICATE_CONNECTION,
                component = COMPONENT,
                alias,
                registered_alias = existing.alias.as_str(),
                "duplicated connection detected; alias was not registered"
            );
            return;
        }

        if self
            .entries
            .iter()
            .any(|entry| entry.alias.eq_ignore_ascii_case(alias))
        {
            info!(
                event = events::REGISTRY_DUPLICATE_ALIAS,
                component = COMPONENT,
                alias,
                "duplicated namespace alias detected; registered only once"
            );
            return;
        }

        self.entries.push(NamespaceInfo::new(alias, connection, purpose));
    }

    /// Case-insensitive alias lookup.
    pub fn get(&self, alias: &str) -> Result<&NamespaceInfo, NamespaceNotFound> {
        self.entries
            .iter()
            .find(|entry| entry.alias.eq_ignore_ascii_case(alias))
            .ok_or_else(|| NamespaceNotFound::new(alias))
    }

    /// Resolves the connection registered for an alias.
    pub fn connection(&self, alias: &str) -> Result<&str, NamespaceNotFound> {
        self.get(alias).map(|entry| entry.connection.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NamespaceInfo> {
        self.entries.iter()
    }
}
