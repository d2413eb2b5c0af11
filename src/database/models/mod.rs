//! Database model exports.

pub mod document;
pub mod filter;
pub mod notification;

pub use document::{fields, Document, Fields, ID_FIELD};
pub use filter::{apply_filters, matches_all, Filter, FilterOp};
pub use notification::{
    HealthAlert, NewHealthAlert, NewNotification, Notification, Priority, Severity,
};

/// Owner field used for identity scoping.
pub const USER_ID_FIELD: &str = "userId";

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const READ_FIELD: &str = "read";
pub const READ_AT_FIELD: &str = "readAt";
pub const ACKNOWLEDGED_FIELD: &str = "acknowledged";
pub const ACKNOWLEDGED_AT_FIELD: &str = "acknowledgedAt";

/// Collections written by the realtime domain operations.
pub const NOTIFICATIONS: &str = "notifications";
pub const HEALTH_METRICS: &str = "health_metrics";
pub const HEALTH_ALERTS: &str = "health_alerts";
