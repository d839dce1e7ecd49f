//! Canonical structured event names used across `bus-topology`.

// Namespace registry events.
pub const REGISTRY_DUPLICATE_CONNECTION: &str = "registry_duplicate_connection";
pub const REGISTRY_DUPLICATE_ALIAS: &str = "registry_duplicate_alias";

// Topology section and creation events.
pub const SECTION_INITIALIZE_OK: &str = "section_initialize_ok";
pub const SECTION_INITIALIZE_SKIPPED: &str = "section_initialize_skipped";
pub const MANAGE_RIGHTS_OK: &str = "manage_rights_ok";
pub const MANAGE_RIGHTS_DENIED: &str = "manage_rights_denied";
pub const ENTITY_CREATE_OK: &str = "entity_create_ok";
pub const ENTITY_CREATE_ALREADY_EXISTS: &str = "entity_create_already_exists";
pub const ENTITY_CREATE_RETRY: &str = "entity_create_retry";
pub const ENTITY_CREATE_FAILED: &str = "entity_create_failed";
pub const RESOURCES_CREATED: &str = "resources_created";
pub const RESOURCES_SKIPPED: &str = "resources_skipped";

// Operator lifecycle events.
pub const OPERATOR_START: &str = "operator_start";
pub const OPERATOR_STOP: &str = "operator_stop";
pub const OPERATOR_PENDING_BUFFERED: &str = "operator_pending_buffered";
pub const OPERATOR_PENDING_REPLAY: &str = "operator_pending_replay";

// Notifier receive-loop events.
pub const NOTIFIER_START: &str = "notifier_start";
pub const NOTIFIER_STOP: &str = "notifier_stop";
pub const NOTIFIER_STREAM_CLOSED: &str = "notifier_stream_closed";
pub const NOTIFIER_TRANSIENT_ERROR: &str = "notifier_transient_error";
pub const NOTIFIER_CRITICAL: &str = "notifier_critical";
pub const NOTIFIER_HANDLER_TIMEOUT: &str = "notifier_handler_timeout";
pub const PROCESSING_FAILURE_HANDLED: &str = "processing_failure_handled";
pub const PROCESSING_FAILURE_RETRY: &str = "processing_failure_retry";

// Outgoing dispatch events.
pub const SENDER_OPEN: &str = "sender_open";
pub const SENDER_REUSE: &str = "sender_reuse";
pub const DISPATCH_SEND_OK: &str = "dispatch_send_ok";
pub const DISPATCH_SEND_FAILED: &str = "dispatch_send_failed";
pub const DISPATCH_OVERSIZED_DELEGATED: &str = "dispatch_oversized_delegated";
pub const DISPATCH_OVERSIZED_SKIPPED: &str = "dispatch_oversized_skipped";
pub const DISPATCH_OVERSIZED_REJECTED: &str = "dispatch_oversized_rejected";
