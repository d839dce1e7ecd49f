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

//! Entity data model and the topology-section value type.

use crate::broker::EntityKind;
use crate::namespaces::NamespaceInfo;
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};

/// One broker entity the topology needs, bound to its hosting namespace.
#[derive(Clone, Debug)]
pub struct EntityInfo {
    pub path: String,
    pub kind: EntityKind,
    pub namespace: NamespaceInfo,
    pub should_be_listened_to: bool,
}

impl EntityInfo {
    pub fn new(
        path: impl Into<String>,
        kind: EntityKind,
        namespace: NamespaceInfo,
        should_be_listened_to: bool,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            namespace,
            should_be_listened_to,
        }
    }

    /// Hashable identity: entity identity is (path, namespace).
    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.path, &self.namespace.alias)
    }
}

/// Stable identity for one entity, usable as a map key.
///
/// The namespace alias is lowercased so identity follows the registry's
/// case-insensitive alias semantics.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EntityKey {
    path: String,
    namespace_alias: String,
}

impl EntityKey {
    pub fn new(path: &str, namespace_alias: &str) -> Self {
        Self {
            path: path.to_string(),
            namespace_alias: namespace_alias.to_ascii_lowercase(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace_alias, self.path)
    }
}

/// Ordered, key-deduplicated set of entities describing one logical
/// operation. Immutable once produced for a settings snapshot.
#[derive(Clone, Debug, Default)]
pub struct TopologySection {
    entities: Vec<EntityInfo>,
}

impl TopologySection {
    /// Builds a section keeping the first occurrence of each entity key.
    pub fn from_entities(entities: Vec<EntityInfo>) -> Self {
        let mut seen: HashSet<EntityKey> = HashSet::new();
        let mut deduped = Vec::with_capacity(entities.len());

        for entity in entities {
            if seen.insert(entity.key()) {
                deduped.push(entity);
            }
        }

        Self { entities: deduped }
    }

    pub fn entities(&self) -> &[EntityInfo] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityInfo> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityInfo, EntityKey, TopologySection};
    use crate::broker::EntityKind;
    use crate::namespaces::{NamespaceInfo, NamespacePurpose};

    fn namespace(alias: &str) -> NamespaceInfo {
        NamespaceInfo::new(alias, "connection", NamespacePurpose::Receiving)
    }

    #[test]
    fn entity_key_is_case_insensitive_on_namespace_alias() {
        let key_a = EntityKey::new("orders", "Primary");
        let key_b = EntityKey::new("orders", "primary");
        let key_c = EntityKey::new("orders", "secondary");

        assert_eq!(key_a, key_b);
        assert_ne!(key_a, key_c);
    }

    #[test]
    fn section_deduplicates_by_key_keeping_first_occurrence() {
        let section = TopologySection::from_entities(vec![
            EntityInfo::new("orders", EntityKind::Queue, namespace("a"), true),
            EntityInfo::new("orders", EntityKind::Queue, namespace("A"), false),
            EntityInfo::new("orders", EntityKind::Queue, namespace("b"), false),
        ]);

        assert_eq!(section.len(), 2);
        assert!(section.entities()[0].should_be_listened_to);
    }

    #[test]
    fn section_preserves_insertion_order() {
        let section = TopologySection::from_entities(vec![
            EntityInfo::new("z", EntityKind::Queue, namespace("a"), false),
            EntityInfo::new("a", EntityKind::Topic, namespace("a"), false),
        ]);

        let paths: Vec<&str> = section.iter().map(|entity| entity.path.as_str()).collect();
        assert_eq!(paths, vec!["z", "a"]);
    }
}
