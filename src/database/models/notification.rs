//! Notification and health alert models.
//!
//! Both are append-only until a single flag flips (`read` / `acknowledged`)
//! and a companion timestamp is added.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Document, Fields};

/// Notification urgency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!(
                "unknown priority `{s}`; expected low|medium|high|urgent"
            )),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Health alert severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Caller-supplied part of a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNotification {
    /// Notification category, e.g. `dose`, `appointment`, `lab_result`
    #[serde(rename = "type")]
    pub kind: String,

    pub title: String,

    pub message: String,

    #[serde(default)]
    pub priority: Priority,

    /// Open-ended payload (deep links, related record ids, ...)
    #[serde(flatten)]
    pub extra: Fields,
}

impl NewNotification {
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            message: message.into(),
            priority: Priority::default(),
            extra: Fields::new(),
        }
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    pub(crate) fn into_fields(self) -> Fields {
        to_fields(&self)
    }
}

/// Stored notification as read back from the `notifications` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl TryFrom<&Document> for Notification {
    type Error = serde_json::Error;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(doc)?)
    }
}

/// Caller-supplied part of a health alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewHealthAlert {
    /// Alert category, e.g. `blood_pressure`, `missed_dose`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub severity: Severity,

    pub message: String,

    #[serde(flatten)]
    pub extra: Fields,
}

impl NewHealthAlert {
    pub fn new(kind: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            severity,
            message: message.into(),
            extra: Fields::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    pub(crate) fn into_fields(self) -> Fields {
        to_fields(&self)
    }
}

/// Stored alert as read back from the `health_alerts` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthAlert {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub acknowledged_at: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl TryFrom<&Document> for HealthAlert {
    type Error = serde_json::Error;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(doc)?)
    }
}

fn to_fields<T: Serialize>(value: &T) -> Fields {
    // Plain structs with string keys always serialize to an object.
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Fields::new(),
    }
}
