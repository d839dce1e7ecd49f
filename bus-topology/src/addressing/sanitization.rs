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

//! Path sanitization strategy seam and the standard implementation.

/// Maps an arbitrary logical name to one satisfying the broker's naming
/// constraints. Must be deterministic; collisions between distinct inputs are
/// a configuration error and are not handled here.
pub trait SanitizationStrategy: Send + Sync {
    fn sanitize(&self, raw_path: &str) -> String;
}

const DEFAULT_MAX_PATH_LENGTH: usize = 260;

/// Keeps alphanumerics, `.`, `-`, `_` and `/`; replaces every other character
/// with `-` and clamps the result to the broker's path length limit.
#[derive(Clone, Debug)]
pub struct StandardSanitization {
    max_length: usize,
}

impl StandardSanitization {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Default for StandardSanitization {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATH_LENGTH)
    }
}

impl SanitizationStrategy for StandardSanitization {
    fn sanitize(&self, raw_path: &str) -> String {
        raw_path
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_' | '/') {
                    ch
                } else {
                    '-'
                }
            })
            .take(self.max_length)
            .collect()
    }
}
