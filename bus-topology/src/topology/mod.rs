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

//! Topology planning, provisioning and the receive-side operator.

pub mod creator;
pub mod entities;
pub(crate) mod notifier;
pub mod operator;
pub mod resources;
pub mod section_manager;

pub use creator::{RetryPolicy, TopologyCreateError, TopologyCreator};
pub use entities::{EntityInfo, EntityKey, TopologySection};
pub use notifier::{NotifierLifecycleError, UnsupportedEntityType};
pub use operator::{OperatorError, TopologyOperator};
pub use resources::TopologyResourcesCreator;
pub use section_manager::{QueueBindings, TopologySectionManager};
