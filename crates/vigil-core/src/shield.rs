//! Shield state evaluator.
//!
//! A state machine over one event: Fast-Critical → Cache/Rule-Check →
//! Remote-Classify → Final. The Fast-Critical check always runs first and
//! always wins; criticality is content-dependent and must never be shadowed
//! by a stale cache entry for the same sender.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{DecisionCache, DEFAULT_CACHE_CAPACITY};
use crate::category::Category;
use crate::classifier::Classify;
use crate::event::{Decision, Event, Verdict};
use crate::matcher::TagMatcher;
use crate::patterns::{library, PatternLibrary};
use crate::rescue::should_rescue;
use crate::rule::{Rule, ShieldLevel};

/// Evaluator configuration.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Decision cache capacity.
    pub cache_capacity: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Maps a per-source rule and an incoming event to a final decision.
pub struct ShieldEvaluator {
    library: &'static PatternLibrary,
    matcher: TagMatcher,
    cache: DecisionCache,
    classifier: Arc<dyn Classify>,
}

impl ShieldEvaluator {
    /// Creates an evaluator with default configuration.
    pub fn new(classifier: Arc<dyn Classify>) -> Self {
        Self::with_config(classifier, EvaluatorConfig::default())
    }

    /// Creates an evaluator with the given configuration.
    pub fn with_config(classifier: Arc<dyn Classify>, config: EvaluatorConfig) -> Self {
        Self {
            library: library(),
            matcher: TagMatcher::new(),
            cache: DecisionCache::with_capacity(config.cache_capacity),
            classifier,
        }
    }

    /// The shared decision cache.
    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    /// Evaluates one event against its rule.
    ///
    /// The matcher and cache stages are infallible by construction
    /// (poisoned locks are recovered, pattern sets are static); an
    /// unresolved stage falls through to the next one, so the worst
    /// internal fault yields the classifier's default category, never an
    /// unintended hard block.
    pub async fn evaluate(&self, event: &Event, rule: &Rule) -> Decision {
        let text = event.combined_text();

        // Fast-Critical: fires regardless of configuration, cache state, or
        // shield level.
        if self.library.is_critical(&text) {
            debug!(source = %event.source, "critical pattern matched, breaking through");
            return Decision::critical();
        }

        match rule.shield_level {
            ShieldLevel::Open | ShieldLevel::None => Decision::pass_through(),
            ShieldLevel::Fortress => self.evaluate_fortress(event, rule),
            ShieldLevel::Smart => self.evaluate_smart(event, rule).await,
        }
    }

    /// Fortress blocks independent of category, so no remote call is made;
    /// rescue is evaluated from what tag matching or the cache already
    /// know.
    fn evaluate_fortress(&self, event: &Event, rule: &Rule) -> Decision {
        let outcome = self
            .matcher
            .evaluate(event, &rule.active_tags, &rule.custom_keywords);

        let category = outcome
            .tag
            .or_else(|| self.cache.get(&event.source, &event.title));

        let rescued = should_rescue(category, &rule.active_tags);
        Decision::block(category, rescued)
    }

    async fn evaluate_smart(&self, event: &Event, rule: &Rule) -> Decision {
        let outcome = self
            .matcher
            .evaluate(event, &rule.active_tags, &rule.custom_keywords);

        if outcome.allowed {
            return Decision {
                verdict: Verdict::Allow,
                rescued: false,
                category: outcome.tag,
                reason: outcome.reason,
            };
        }

        // Unresolved: prior cached verdict, then one remote classification.
        let category = match self.cache.get(&event.source, &event.title) {
            Some(cached) => {
                debug!(source = %event.source, category = %cached, "cache hit");
                cached
            }
            None => {
                let resolved = self
                    .classifier
                    .classify(&event.title, &event.body, &event.source)
                    .await;
                if !resolved.is_critical() {
                    self.cache.put(&event.source, &event.title, resolved);
                }
                resolved
            }
        };

        if rule.has_tag(category) {
            return Decision::allow_with_category(category);
        }

        let rescued = should_rescue(Some(category), &rule.active_tags);
        Decision::block(Some(category), rescued)
    }
}
