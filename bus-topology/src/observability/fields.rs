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

//! Value-format helpers for structured log fields.

use crate::topology::entities::EntityInfo;

pub const NONE: &str = "none";

/// Compact `alias/path` form used wherever an entity appears in a log field.
pub fn format_entity(entity: &EntityInfo) -> String {
    format!("{}/{}", entity.namespace.alias, entity.path)
}

pub fn format_optional(value: Option<&str>) -> String {
    value.unwrap_or(NONE).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_entity, format_optional, NONE};
    use crate::broker::EntityKind;
    use crate::namespaces::{NamespaceInfo, NamespacePurpose};
    use crate::topology::entities::EntityInfo;

    #[test]
    fn format_entity_uses_alias_and_path() {
        let entity = EntityInfo::new(
            "orders",
            EntityKind::Queue,
            NamespaceInfo::new("primary", "connection-1", NamespacePurpose::Receiving),
            true,
        );

        assert_eq!(format_entity(&entity), "primary/orders");
    }

    #[test]
    fn format_optional_falls_back_to_none() {
        assert_eq!(format_optional(None), NONE);
        assert_eq!(format_optional(Some("value")), "value");
    }
}
