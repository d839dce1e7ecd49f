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

//! Path composition strategy seam and the shipped flat/hierarchical forms.

/// Builds a structured entity path from already-sanitized components.
/// Components are never reordered.
pub trait CompositionStrategy: Send + Sync {
    fn compose(&self, parts: &[&str]) -> String;
}

/// Joins components with `-` into a single flat segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatComposition;

impl CompositionStrategy for FlatComposition {
    fn compose(&self, parts: &[&str]) -> String {
        join_non_empty(parts, "-")
    }
}

/// Joins components with `/` into a hierarchical path.
#[derive(Clone, Copy, Debug, Default)]
pub struct HierarchyComposition;

impl CompositionStrategy for HierarchyComposition {
    fn compose(&self, parts: &[&str]) -> String {
        join_non_empty(parts, "/")
    }
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<&str>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::{CompositionStrategy, FlatComposition, HierarchyComposition};

    #[test]
    fn flat_composition_joins_with_dashes() {
        assert_eq!(FlatComposition.compose(&["sales", "1"]), "sales-1");
    }

    #[test]
    fn hierarchy_composition_joins_with_slashes() {
        assert_eq!(
            HierarchyComposition.compose(&["bundle-1", "subscriptions", "sales"]),
            "bundle-1/subscriptions/sales"
        );
    }

    #[test]
    fn empty_components_are_dropped_without_reordering() {
        assert_eq!(FlatComposition.compose(&["sales", "", "2"]), "sales-2");
        assert_eq!(HierarchyComposition.compose(&["", "sales"]), "sales");
    }
}
