//! Per-event entry point.
//!
//! [`ShieldService`] ties the shield evaluator to the external
//! collaborators: the rule store, the blocked-record store, the urgent
//! alert sink, and the optional significant-sender oracle. Each incoming
//! event is an independent unit of work; the service is cheaply cloneable
//! and safe to share across concurrent tasks. Strict per-sender ordering is
//! not provided here; callers that need it serialize per source.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::category::Category;
use crate::classifier::Classify;
use crate::error::Result;
use crate::event::{Decision, Event};
use crate::rescue::{AlertSink, NullAlertSink};
use crate::rule::Rule;
use crate::shield::{EvaluatorConfig, ShieldEvaluator};

/// Read access to per-source rules. One rule per (source, profile) pair;
/// a missing rule means the source passes through unfiltered.
pub trait RuleStore: Send + Sync {
    /// Returns the rule for a source under a profile, if one exists.
    fn rule_for(&self, source: &str, profile_id: &str) -> Result<Option<Rule>>;
}

/// Append access to the blocked-event record store.
pub trait RecordStore: Send + Sync {
    /// Persists one blocked event with its resolved category.
    fn append_blocked(&self, event: &Event, category: Option<Category>) -> Result<()>;
}

/// External judgment of whether a sender is significant to the user.
pub trait SenderOracle: Send + Sync {
    /// Returns true when the display name belongs to a significant sender.
    fn is_significant(&self, display_name: &str) -> bool;
}

/// Processes incoming events end to end.
#[derive(Clone)]
pub struct ShieldService {
    evaluator: Arc<ShieldEvaluator>,
    rules: Arc<dyn RuleStore>,
    records: Arc<dyn RecordStore>,
    alerts: Arc<dyn AlertSink>,
    oracle: Option<Arc<dyn SenderOracle>>,
    profile_id: String,
}

impl ShieldService {
    /// Creates a service for the default profile with no alert sink or
    /// oracle wired up.
    pub fn new(
        classifier: Arc<dyn Classify>,
        rules: Arc<dyn RuleStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self::with_config(classifier, rules, records, EvaluatorConfig::default())
    }

    /// Creates a service with an explicit evaluator configuration.
    pub fn with_config(
        classifier: Arc<dyn Classify>,
        rules: Arc<dyn RuleStore>,
        records: Arc<dyn RecordStore>,
        config: EvaluatorConfig,
    ) -> Self {
        Self {
            evaluator: Arc::new(ShieldEvaluator::with_config(classifier, config)),
            rules,
            records,
            alerts: Arc::new(NullAlertSink),
            oracle: None,
            profile_id: "default".to_string(),
        }
    }

    /// Sets the urgent alert sink.
    pub fn with_alert_sink(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Sets the significant-sender oracle.
    pub fn with_oracle(mut self, oracle: Arc<dyn SenderOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Sets the active profile.
    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = profile_id.into();
        self
    }

    /// The underlying evaluator (cache inspection, tests).
    pub fn evaluator(&self) -> &ShieldEvaluator {
        &self.evaluator
    }

    /// Decides one event: deliver or suppress, with rescue handling.
    ///
    /// Store failures are never fatal: an unreadable rule store behaves as
    /// "no rule" (pass through, per the default-allow invariant), and a
    /// failed record append is logged and dropped.
    pub async fn process(&self, event: &Event) -> Decision {
        let rule = match self.rules.rule_for(&event.source, &self.profile_id) {
            Ok(Some(rule)) => rule,
            Ok(None) => {
                debug!(source = %event.source, "no rule configured, passing through");
                return Decision::pass_through();
            }
            Err(err) => {
                warn!(source = %event.source, error = %err, "rule store unavailable, passing through");
                return Decision::pass_through();
            }
        };

        if let Some(oracle) = &self.oracle {
            if oracle.is_significant(&event.title) {
                debug!(source = %event.source, "significant sender, allowing");
                return Decision::allow("significant-sender");
            }
        }

        let decision = self.evaluator.evaluate(event, &rule).await;

        if decision.is_blocked() {
            if let Err(err) = self.records.append_blocked(event, decision.category) {
                warn!(source = %event.source, error = %err, "failed to record blocked event");
            }
            if decision.rescued {
                self.alerts.emit_urgent(&event.source, &event.title);
            }
        }

        debug!(
            source = %event.source,
            verdict = ?decision.verdict,
            rescued = decision.rescued,
            reason = %decision.reason,
            "event decided"
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::CoreError;
    use crate::event::Verdict;
    use crate::rescue::RecordingAlertSink;
    use crate::rule::ShieldLevel;

    struct FixedClassifier {
        category: Category,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(category: Category) -> Self {
            Self {
                category,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Classify for FixedClassifier {
        async fn classify(&self, _title: &str, _body: &str, _source: &str) -> Category {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.category
        }

        async fn summarize(&self, _source: &str, _items: &[String]) -> String {
            String::new()
        }
    }

    #[derive(Default)]
    struct MemoryRuleStore {
        rules: Mutex<HashMap<(String, String), Rule>>,
    }

    impl MemoryRuleStore {
        fn with_rule(rule: Rule) -> Self {
            let store = Self::default();
            store
                .rules
                .lock()
                .unwrap()
                .insert((rule.source.clone(), rule.profile_id.clone()), rule);
            store
        }
    }

    impl RuleStore for MemoryRuleStore {
        fn rule_for(&self, source: &str, profile_id: &str) -> Result<Option<Rule>> {
            Ok(self
                .rules
                .lock()
                .unwrap()
                .get(&(source.to_string(), profile_id.to_string()))
                .cloned())
        }
    }

    struct FailingRuleStore;

    impl RuleStore for FailingRuleStore {
        fn rule_for(&self, _source: &str, _profile_id: &str) -> Result<Option<Rule>> {
            Err(CoreError::Store("database locked".to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryRecordStore {
        records: Mutex<Vec<(String, Option<Category>)>>,
    }

    impl MemoryRecordStore {
        fn records(&self) -> Vec<(String, Option<Category>)> {
            self.records.lock().unwrap().clone()
        }
    }

    impl RecordStore for MemoryRecordStore {
        fn append_blocked(&self, event: &Event, category: Option<Category>) -> Result<()> {
            self.records
                .lock()
                .unwrap()
                .push((event.source.clone(), category));
            Ok(())
        }
    }

    struct StaticOracle(bool);

    impl SenderOracle for StaticOracle {
        fn is_significant(&self, _display_name: &str) -> bool {
            self.0
        }
    }

    fn service_with(
        classifier: Arc<FixedClassifier>,
        rule: Rule,
    ) -> (ShieldService, Arc<MemoryRecordStore>, Arc<RecordingAlertSink>) {
        let records = Arc::new(MemoryRecordStore::default());
        let alerts = Arc::new(RecordingAlertSink::new());
        let service = ShieldService::new(
            classifier,
            Arc::new(MemoryRuleStore::with_rule(rule)),
            Arc::clone(&records) as Arc<dyn RecordStore>,
        )
        .with_alert_sink(Arc::clone(&alerts) as Arc<dyn AlertSink>);
        (service, records, alerts)
    }

    // === Boundary tests ===

    #[tokio::test]
    async fn unconfigured_source_passes_through() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let records = Arc::new(MemoryRecordStore::default());
        let service = ShieldService::new(
            Arc::clone(&classifier) as Arc<dyn Classify>,
            Arc::new(MemoryRuleStore::default()),
            Arc::clone(&records) as Arc<dyn RecordStore>,
        );

        let event = Event::new("unknown.app", "Anything", "at all", 0);
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Allow);
        assert_eq!(classifier.calls(), 0);
        assert!(records.records().is_empty());
    }

    #[tokio::test]
    async fn rule_store_failure_passes_through() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let service = ShieldService::new(
            Arc::clone(&classifier) as Arc<dyn Classify>,
            Arc::new(FailingRuleStore),
            Arc::new(MemoryRecordStore::default()),
        );

        let event = Event::new("chat.app", "Alex", "sent you a message", 0);
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Allow);
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn significant_sender_allows_before_state_machine() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("chat.app", "default", ShieldLevel::Fortress);
        let (service, records, _) = service_with(Arc::clone(&classifier), rule);
        let service = service.with_oracle(Arc::new(StaticOracle(true)));

        let event = Event::new("chat.app", "Mom", "call me back", 0);
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Allow);
        assert_eq!(decision.reason, "significant-sender");
        assert!(records.records().is_empty());
        assert_eq!(classifier.calls(), 0);
    }

    // === End-to-end scenarios ===

    #[tokio::test]
    async fn smart_direct_chat_is_delivered() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("chat.app", "default", ShieldLevel::Smart)
            .with_tags([Category::DirectChats]);
        let (service, records, alerts) = service_with(Arc::clone(&classifier), rule);

        let event = Event::new("chat.app", "Alex", "sent you a message", 0);
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Allow);
        assert_eq!(decision.reason, "Direct Message");
        assert!(records.records().is_empty());
        assert!(alerts.alerts().is_empty());
    }

    #[tokio::test]
    async fn smart_promo_is_blocked_and_recorded() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("chat.app", "default", ShieldLevel::Smart)
            .with_tags([Category::DirectChats]);
        let (service, records, alerts) = service_with(Arc::clone(&classifier), rule);

        let event = Event::new("chat.app", "Promo Team", "50% off today only!", 0);
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Block);
        assert!(!decision.rescued);
        assert_eq!(decision.category, Some(Category::Promotions));

        let recorded = records.records();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].1, Some(Category::Promotions));
        assert!(alerts.alerts().is_empty());
    }

    #[tokio::test]
    async fn critical_event_is_allowed_not_recorded() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("bank.app", "default", ShieldLevel::Fortress);
        let (service, records, _) = service_with(Arc::clone(&classifier), rule);

        let event = Event::new(
            "bank.app",
            "Bank Alert",
            "Suspicious login attempt, verify at once",
            0,
        );
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Allow);
        assert!(decision.rescued);
        assert!(records.records().is_empty());
    }

    #[tokio::test]
    async fn rescued_block_fires_urgent_alert() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("mail.app", "default", ShieldLevel::Fortress)
            .with_tags([Category::Security]);
        let (service, records, alerts) = service_with(Arc::clone(&classifier), rule);

        let event = Event::new("mail.app", "Mail", "Your verification code is 123456", 0);
        let decision = service.process(&event).await;

        assert_eq!(decision.verdict, Verdict::Block);
        assert!(decision.rescued);
        assert_eq!(records.records().len(), 1);

        let fired = alerts.alerts();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, "mail.app");
    }

    #[tokio::test]
    async fn profile_scopes_rule_lookup() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("chat.app", "kid", ShieldLevel::Fortress);
        let (service, _, _) = service_with(Arc::clone(&classifier), rule);

        // The service runs the "default" profile; the rule belongs to "kid".
        let event = Event::new("chat.app", "Promo Team", "50% off today only!", 0);
        let decision = service.process(&event).await;
        assert_eq!(decision.verdict, Verdict::Allow);

        // Under the owning profile the same event is blocked.
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("chat.app", "kid", ShieldLevel::Fortress);
        let (service, _, _) = service_with(Arc::clone(&classifier), rule);
        let service = service.with_profile("kid");
        let decision = service.process(&event).await;
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[tokio::test]
    async fn concurrent_events_share_the_cache() {
        let classifier = Arc::new(FixedClassifier::new(Category::Promotions));
        let rule = Rule::new("shop.app", "default", ShieldLevel::Smart);
        let (service, _, _) = service_with(Arc::clone(&classifier), rule);

        let event = Event::new("shop.app", "Promo Team", "50% off today only!", 0);
        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = service.clone();
            let event = event.clone();
            handles.push(tokio::spawn(async move { service.process(&event).await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().verdict, Verdict::Block);
        }

        // At least one unit classified remotely; later identical lookups hit
        // the shared cache. Concurrent first arrivals may race, but a fifth
        // call is certainly cached.
        let calls_before = classifier.calls();
        let _ = service.process(&event).await;
        assert_eq!(classifier.calls(), calls_before);
    }
}
