//! Critical change classification.
//!
//! Derives a severity-tagged report from a [`ComparisonResult`]. Only changes
//! to structural element types are reported:
//!
//! | Change   | Severity |
//! |----------|----------|
//! | removed  | HIGH |
//! | modified | MEDIUM if a dimension or material key changed, else LOW |
//! | added    | LOW |
//!
//! Classification never notifies anyone. Callers check
//! [`CriticalChangeReport::requires_notification`] and invoke a
//! [`ChangeNotifier`](crate::notify::ChangeNotifier) themselves.

use crate::config::CriticalTypeConfig;
use crate::diff::model::{ChangeType, ComparisonResult, ElementChange, PropertyChange};
use crate::{log_op_end, log_op_start};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Severity of a critical change. Orders `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        };
        f.write_str(label)
    }
}

/// One classified change to a structural element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalChange {
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_changes: Option<Vec<PropertyChange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub express_id: Option<u64>,
    #[serde(rename = "type")]
    pub element_type: String,
    pub change_type: ChangeType,
}

/// True totals per severity, independent of the listing cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalChangeSummary {
    pub total_critical: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
}

impl CriticalChangeSummary {
    fn record(&mut self, severity: Severity) {
        self.total_critical += 1;
        match severity {
            Severity::High => self.high_severity += 1,
            Severity::Medium => self.medium_severity += 1,
            Severity::Low => self.low_severity += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalChangeReport {
    pub summary: CriticalChangeSummary,
    /// Most severe first, at most `max_listed` entries
    pub critical_changes: Vec<CriticalChange>,
    /// True when entries were dropped from `critical_changes`
    #[serde(default)]
    pub truncated: bool,
}

impl CriticalChangeReport {
    /// True when at least one HIGH severity change was found
    pub fn requires_notification(&self) -> bool {
        self.summary.high_severity > 0
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_critical == 0
    }
}

/// Human label for an element: quoted name when present, else its identity.
fn element_label(change: &ElementChange) -> String {
    match (&change.name, change.identity_key()) {
        (Some(name), _) => format!("'{}'", name),
        (None, Some(key)) => key.to_string(),
        (None, None) => "<unidentified>".to_string(),
    }
}

fn classify_change(
    change: &ElementChange,
    config: &CriticalTypeConfig,
) -> CriticalChange {
    let label = element_label(change);
    let (severity, description, property_changes) = match change.change_type {
        ChangeType::Removed => (
            Severity::High,
            format!("Structural element removed: {} {}", change.element_type, label),
            None,
        ),
        ChangeType::Added => (
            Severity::Low,
            format!("Structural element added: {} {}", change.element_type, label),
            None,
        ),
        ChangeType::Modified => {
            let touched: Vec<&str> = change
                .property_changes()
                .iter()
                .map(|pc| pc.property_name.as_str())
                .filter(|name| config.is_dimension_key(name))
                .collect();
            if touched.is_empty() {
                (
                    Severity::Low,
                    format!(
                        "Non-dimensional properties changed on {} {}",
                        change.element_type, label
                    ),
                    change.property_changes.clone(),
                )
            } else {
                (
                    Severity::Medium,
                    format!(
                        "Dimension or material change on {} {}: {}",
                        change.element_type,
                        label,
                        touched.join(", ")
                    ),
                    change.property_changes.clone(),
                )
            }
        }
    };

    CriticalChange {
        severity,
        description,
        property_changes,
        global_id: change.global_id.clone(),
        express_id: change.express_id,
        element_type: change.element_type.clone(),
        change_type: change.change_type,
    }
}

/// Classify the structural changes of a comparison.
///
/// Changes to non-critical types are left out entirely. `summary` counts every
/// critical change; `critical_changes` is sorted most severe first (stable,
/// so equal severities keep removed, modified, added order) and capped at
/// `config.max_listed`.
pub fn classify(result: &ComparisonResult, config: &CriticalTypeConfig) -> CriticalChangeReport {
    let started = Instant::now();
    log_op_start!(
        "classify",
        old_version = %result.identity.old_version_id,
        new_version = %result.identity.new_version_id
    );

    let critical_types = config.critical_type_set();

    let mut summary = CriticalChangeSummary::default();
    let mut critical_changes: Vec<CriticalChange> = result
        .all_changes()
        .filter(|change| critical_types.contains(&change.element_type))
        .map(|change| classify_change(change, config))
        .inspect(|critical| summary.record(critical.severity))
        .collect();

    critical_changes.sort_by(|a, b| b.severity.cmp(&a.severity));
    let truncated = critical_changes.len() > config.max_listed;
    critical_changes.truncate(config.max_listed);

    log_op_end!(
        "classify",
        duration_ms = started.elapsed().as_millis() as u64,
        total_critical = summary.total_critical,
        high_severity = summary.high_severity
    );

    CriticalChangeReport {
        summary,
        critical_changes,
        truncated,
    }
}
