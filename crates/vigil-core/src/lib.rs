//! Vigil Core - Notification decision pipeline.
//!
//! Decides, per incoming notification event, whether the event is delivered
//! or suppressed, and whether a suppressed event must be rescued through an
//! urgent side channel because it is safety-critical.
//!
//! The pipeline per event: fast critical-pattern check, custom-keyword and
//! tag matching against the source's rule, a bounded decision cache, a
//! remote classifier with a hard timeout as the fallback, and finally the
//! rescue trigger for blocked events.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil_core::{
//!     ClassifierConfig, Event, RemoteClassifier, ShieldService,
//! };
//! # use vigil_core::{RuleStore, RecordStore};
//! # fn stores() -> (Arc<dyn RuleStore>, Arc<dyn RecordStore>) { unimplemented!() }
//!
//! # async fn run() {
//! let (rules, records) = stores();
//! let classifier = Arc::new(RemoteClassifier::new(ClassifierConfig::default()));
//! let service = ShieldService::new(classifier, rules, records);
//!
//! let event = Event::new("chat.app", "Alex", "sent you a message", 0);
//! let decision = service.process(&event).await;
//! if decision.is_allowed() {
//!     // deliver normally
//! }
//! # }
//! ```

pub mod cache;
pub mod category;
pub mod classifier;
pub mod error;
pub mod event;
pub mod matcher;
pub mod patterns;
pub mod rescue;
pub mod rule;
pub mod service;
pub mod shield;

pub use cache::{DecisionCache, DEFAULT_CACHE_CAPACITY};
pub use category::{Category, Family};
pub use classifier::{
    Classify, ClassifierConfig, RemoteClassifier, DEFAULT_CATEGORY, SUMMARY_ITEM_CAP,
};
pub use error::{CoreError, Result};
pub use event::{Decision, Event, Verdict};
pub use matcher::{MatchOutcome, TagMatcher, CUSTOM_RULE_REASON};
pub use patterns::{library, PatternLibrary};
pub use rescue::{should_rescue, AlertSink, NullAlertSink, RecordingAlertSink};
#[cfg(feature = "desktop-alerts")]
pub use rescue::desktop::DesktopAlertSink;
pub use rule::{Rule, ShieldLevel};
pub use service::{RecordStore, RuleStore, SenderOracle, ShieldService};
pub use shield::{EvaluatorConfig, ShieldEvaluator};
