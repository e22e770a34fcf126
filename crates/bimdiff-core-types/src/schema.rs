//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across every crate that logs
//! a comparison operation.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Snapshot identifiers
pub const FIELD_OLD_VERSION: &str = "old_version";
pub const FIELD_NEW_VERSION: &str = "new_version";
pub const FIELD_VERSION_COUNT: &str = "version_count";

// Result sizes
pub const FIELD_TOTAL_CHANGES: &str = "total_changes";
pub const FIELD_WARNING_COUNT: &str = "warning_count";
pub const FIELD_HIGH_SEVERITY: &str = "high_severity";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
