//! Notification interface for high-severity structural changes.

use crate::classify::CriticalChangeReport;
use crate::diff::model::ComparisonIdentity;
use crate::errors::{ExError, ExErrorKind};
use std::sync::Mutex;

/// Deliver a critical change report to an alerting collaborator.
///
/// Invoked by callers when [`CriticalChangeReport::requires_notification`]
/// is true. The classifier itself never calls this.
pub trait ChangeNotifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExErrorKind::ExternalService` if delivery fails.
    fn notify_critical_changes(
        &self,
        comparison: &ComparisonIdentity,
        report: &CriticalChangeReport,
    ) -> Result<(), ExError>;
}

/// Drops every notification. Used when no notifier is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangeNotifier;

impl ChangeNotifier for NoopChangeNotifier {
    fn notify_critical_changes(
        &self,
        comparison: &ComparisonIdentity,
        report: &CriticalChangeReport,
    ) -> Result<(), ExError> {
        tracing::debug!(
            component = module_path!(),
            old_version = %comparison.old_version_id,
            new_version = %comparison.new_version_id,
            high_severity = report.summary.high_severity,
            "no notifier configured, dropping critical change notification"
        );
        Ok(())
    }
}

/// A delivered notification, as seen by [`RecordingChangeNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalNotification {
    pub comparison: ComparisonIdentity,
    pub report: CriticalChangeReport,
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingChangeNotifier {
    delivered: Mutex<Vec<CriticalNotification>>,
}

impl RecordingChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<CriticalNotification> {
        self.delivered
            .lock()
            .map(|delivered| delivered.to_vec())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().map(|d| d.len()).unwrap_or(0)
    }
}

impl ChangeNotifier for RecordingChangeNotifier {
    fn notify_critical_changes(
        &self,
        comparison: &ComparisonIdentity,
        report: &CriticalChangeReport,
    ) -> Result<(), ExError> {
        let mut delivered = self.delivered.lock().map_err(|_| {
            ExError::new(ExErrorKind::ExternalService)
                .with_op("notify_critical_changes")
                .with_message("notification log lock poisoned")
        })?;
        delivered.push(CriticalNotification {
            comparison: comparison.clone(),
            report: report.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ComparisonIdentity {
        ComparisonIdentity {
            old_version_id: "v1".to_string(),
            new_version_id: "v2".to_string(),
            old_digest: String::new(),
            new_digest: String::new(),
        }
    }

    #[test]
    fn test_noop_notifier_accepts_everything() {
        let notifier = NoopChangeNotifier;
        assert!(notifier
            .notify_critical_changes(&identity(), &CriticalChangeReport::default())
            .is_ok());
    }

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingChangeNotifier::new();
        let mut report = CriticalChangeReport::default();
        notifier.notify_critical_changes(&identity(), &report).unwrap();
        report.summary.high_severity = 2;
        notifier.notify_critical_changes(&identity(), &report).unwrap();

        let seen = notifier.notifications();
        assert_eq!(notifier.count(), 2);
        assert_eq!(seen[0].report.summary.high_severity, 0);
        assert_eq!(seen[1].report.summary.high_severity, 2);
        assert_eq!(seen[1].comparison.new_version_id, "v2");
    }
}
