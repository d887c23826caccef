//! Remote classifier adapter.
//!
//! Issues bounded-timeout classification and summarization requests against
//! an OpenAI-style chat-completions backend and maps raw output back to the
//! internal [`Category`] vocabulary. Both operations are total from the
//! caller's perspective: any timeout, transport failure, or unexpected label
//! resolves to a documented fallback, never an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::category::Category;

/// Category resolved when classification fails or returns an unknown label.
pub const DEFAULT_CATEGORY: Category = Category::Updates;

/// Maximum number of raw texts forwarded to the summarization backend.
/// Older entries beyond the cap are replaced with an "(and N more)" marker.
pub const SUMMARY_ITEM_CAP: usize = 6;

/// Maximum distinct senders named by the local summary fallback.
const SUMMARY_MAX_SENDERS: usize = 3;

/// Classification seam. The shield evaluator and service depend on this
/// trait, not on the HTTP implementation.
#[async_trait]
pub trait Classify: Send + Sync {
    /// Classifies one notification. Total: always returns a category.
    async fn classify(&self, title: &str, body: &str, source: &str) -> Category;

    /// Summarizes a batch of raw notification texts for one source.
    /// Total: falls back to a locally computed summary on any failure.
    async fn summarize(&self, source: &str, items: &[String]) -> String;
}

/// Remote classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Bearer token, if the backend requires one.
    pub api_key: Option<String>,
    /// Model identifier sent with each request.
    pub model: String,
    /// Hard timeout for one remote call.
    pub timeout: Duration,
    /// Token budget for classification replies (a single label).
    pub classify_max_tokens: u32,
    /// Token budget for summarization replies.
    pub summary_max_tokens: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(4),
            classify_max_tokens: 8,
            summary_max_tokens: 60,
        }
    }
}

impl ClassifierConfig {
    /// Sets the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the hard timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// === Wire shapes ===

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, thiserror::Error)]
enum RemoteError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response carried no choices")]
    EmptyResponse,
}

/// HTTP-backed implementation of [`Classify`].
pub struct RemoteClassifier {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl RemoteClassifier {
    /// Creates a classifier with the given configuration.
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a classifier with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ClassifierConfig::default())
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// One chat-completions round trip, bounded by the configured timeout.
    /// On expiry the outbound call is abandoned.
    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, RemoteError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
        };

        let mut builder = self.http.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?.error_for_status()?;
        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(RemoteError::EmptyResponse)
    }
}

#[async_trait]
impl Classify for RemoteClassifier {
    async fn classify(&self, title: &str, body: &str, source: &str) -> Category {
        let prompt = classification_prompt(title, body, source);

        let outcome = tokio::time::timeout(
            self.config.timeout,
            self.complete(prompt, self.config.classify_max_tokens),
        )
        .await;

        match outcome {
            Ok(Ok(content)) => {
                let label = content.trim().to_lowercase();
                match map_label(&label) {
                    Some(category) => {
                        debug!(source, %category, "remote classification resolved");
                        category
                    }
                    None => {
                        warn!(source, %label, "unknown classifier label, using default");
                        DEFAULT_CATEGORY
                    }
                }
            }
            Ok(Err(err)) => {
                warn!(source, error = %err, "classification failed, using default");
                DEFAULT_CATEGORY
            }
            Err(_) => {
                warn!(source, "classification timed out, using default");
                DEFAULT_CATEGORY
            }
        }
    }

    async fn summarize(&self, source: &str, items: &[String]) -> String {
        if items.is_empty() {
            return String::new();
        }

        let capped = capped_items(items);
        let prompt = summary_prompt(source, &capped);

        let outcome = tokio::time::timeout(
            self.config.timeout,
            self.complete(prompt, self.config.summary_max_tokens),
        )
        .await;

        match outcome {
            Ok(Ok(content)) if !content.trim().is_empty() => content.trim().to_string(),
            Ok(Ok(_)) | Ok(Err(_)) | Err(_) => {
                warn!(source, "summarization failed, using local fallback");
                local_summary(items)
            }
        }
    }
}

/// Builds the fixed-vocabulary classification prompt. Every selectable tag
/// is enumerated with illustrative trigger words.
fn classification_prompt(title: &str, body: &str, source: &str) -> String {
    let mut labels = String::new();
    for tag in Category::priority_order() {
        labels.push_str(&format!("- {} ({})\n", tag.as_str(), label_hints(*tag)));
    }

    format!(
        "Classify the phone notification below into exactly one label from \
         this list:\n{labels}\n\
         Reply with the label only, nothing else.\n\n\
         App: {source}\nTitle: {title}\nBody: {body}"
    )
}

fn summary_prompt(source: &str, items: &[String]) -> String {
    let mut listing = String::new();
    for item in items {
        listing.push_str("- ");
        listing.push_str(item);
        listing.push('\n');
    }

    format!(
        "Summarize the following blocked notifications from {source} in one \
         short sentence:\n{listing}"
    )
}

/// Illustrative trigger words embedded in the classification prompt.
fn label_hints(tag: Category) -> &'static str {
    match tag {
        Category::Critical => "safety-critical",
        Category::Security => "login, verification code, password",
        Category::Finance => "payment, invoice, transfer, balance",
        Category::Emergency => "urgent warning, emergency",
        Category::DirectChats => "someone sent you a message",
        Category::GroupThreads => "group chat, thread digest",
        Category::Mentions => "mentioned you, replied to you",
        Category::Calls => "incoming call, missed call, voicemail",
        Category::Work => "ticket, pull request, task",
        Category::Meetings => "meeting invite, calendar event",
        Category::Documents => "shared document, file comment",
        Category::Storage => "backup, sync, storage full",
        Category::SmartHome => "doorbell, camera, thermostat",
        Category::Health => "workout, steps, medication",
        Category::Transport => "ride, delivery driver, flight",
        Category::Shopping => "order shipped, package",
        Category::Entertainment => "new episode, now streaming",
        Category::News => "breaking news, headlines",
        Category::Updates => "app update, new version",
        Category::Promotions => "sale, discount, % off",
    }
}

/// Maps a trimmed, lower-cased label to the internal vocabulary.
///
/// Accepts stable identifiers, display names, and a small set of synonyms
/// the backends are known to produce. Anything else maps to no category.
fn map_label(label: &str) -> Option<Category> {
    if let Some(category) = Category::parse(label) {
        // The classifier vocabulary is the tag set; "critical" is not a
        // valid remote output.
        return if category.is_critical() {
            Some(Category::Emergency)
        } else {
            Some(category)
        };
    }

    let category = match label {
        "direct message" | "direct messages" | "dm" | "dms" | "message" | "messages" | "chat" => {
            Category::DirectChats
        }
        "group" | "groups" | "group thread" | "group threads" | "group chat" => {
            Category::GroupThreads
        }
        "mention" | "mentions" | "reply" | "replies" => Category::Mentions,
        "call" | "calls" | "phone" => Category::Calls,
        "meeting" | "calendar" => Category::Meetings,
        "document" | "docs" | "files" => Category::Documents,
        "smart home" | "smarthome" | "home" => Category::SmartHome,
        "fitness" => Category::Health,
        "travel" | "ride" | "transit" => Category::Transport,
        "order" | "orders" => Category::Shopping,
        "media" | "streaming" => Category::Entertainment,
        "headline" | "headlines" => Category::News,
        "update" | "system" => Category::Updates,
        "promotion" | "promo" | "marketing" | "spam" | "advertisement" | "ads" => {
            Category::Promotions
        }
        "bank" | "banking" | "payment" | "payments" => Category::Finance,
        "urgent" => Category::Emergency,
        "backup" => Category::Storage,
        "productivity" => Category::Work,
        _ => return None,
    };

    Some(category)
}

/// Keeps the newest [`SUMMARY_ITEM_CAP`] items, replacing older entries with
/// a count marker.
fn capped_items(items: &[String]) -> Vec<String> {
    if items.len() <= SUMMARY_ITEM_CAP {
        return items.to_vec();
    }

    let dropped = items.len() - SUMMARY_ITEM_CAP;
    let mut capped = Vec::with_capacity(SUMMARY_ITEM_CAP + 1);
    capped.push(format!("(and {dropped} more)"));
    capped.extend(items[dropped..].iter().cloned());
    capped
}

/// Deterministic local summary: distinct "who" prefixes (text before the
/// first `:`) of up to three senders.
fn local_summary(items: &[String]) -> String {
    let mut senders: Vec<&str> = Vec::new();
    for item in items {
        if let Some((who, _)) = item.split_once(':') {
            let who = who.trim();
            if !who.is_empty() && !senders.contains(&who) {
                senders.push(who);
            }
        }
        if senders.len() == SUMMARY_MAX_SENDERS {
            break;
        }
    }

    match senders.as_slice() {
        [] => format!("{} notifications", items.len()),
        [a] => format!("New messages from {a}"),
        [a, b] => format!("New messages from {a} and {b}"),
        [a, b, c, ..] => format!("New messages from {a}, {b} and {c}"),
    }
}
