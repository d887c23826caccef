//! Rescue trigger and the urgent side channel.
//!
//! After a block verdict, an event may still be force-surfaced through an
//! out-of-band urgent channel. The trigger is a two-key check: the resolved
//! category must be the critical pseudo-category, or be one of the
//! inherently urgent categories (security, finance, emergency) that the
//! user has also included in the rule's active tag set. The remote
//! classifier alone never bypasses an explicit block configuration.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::category::Category;

/// Decides whether a blocked event must be rescued.
pub fn should_rescue(final_category: Option<Category>, active_tags: &HashSet<Category>) -> bool {
    match final_category {
        None => false,
        Some(category) if category.is_critical() => true,
        Some(category) => category.is_inherently_urgent() && active_tags.contains(&category),
    }
}

/// Fire-and-forget urgent alert delivery, distinct from the normal
/// notification path.
pub trait AlertSink: Send + Sync {
    /// Emits one urgent alert. Failures are swallowed by implementations;
    /// the pipeline never blocks on alert delivery.
    fn emit_urgent(&self, source: &str, title: &str);
}

/// Sink that drops every alert. Used when no side channel is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn emit_urgent(&self, _source: &str, _title: &str) {}
}

/// Sink that records alerts in memory. Test support.
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    alerts: Mutex<Vec<(String, String)>>,
}

impl RecordingAlertSink {
    /// Creates an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all (source, title) pairs emitted so far.
    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn emit_urgent(&self, source: &str, title: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((source.to_string(), title.to_string()));
    }
}

/// Desktop urgent alerts via the platform notification service.
#[cfg(feature = "desktop-alerts")]
pub mod desktop {
    use tracing::warn;

    use super::AlertSink;

    /// Emits urgent alerts as desktop notifications.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DesktopAlertSink;

    impl DesktopAlertSink {
        /// Creates a desktop sink.
        pub fn new() -> Self {
            Self
        }
    }

    impl AlertSink for DesktopAlertSink {
        fn emit_urgent(&self, source: &str, title: &str) {
            let result = notify_rust::Notification::new()
                .summary(&format!("Urgent: {title}"))
                .body(&format!("A blocked notification from {source} needs attention"))
                .appname("Vigil")
                .show();

            if let Err(err) = result {
                warn!(source, error = %err, "failed to deliver urgent alert");
            }
        }
    }
}
