//! Static pattern library.
//!
//! One pattern set per category tag plus one for the critical
//! pseudo-category. Sets are compiled once at process start and never
//! mutated. Matching is case-insensitive and unanchored over the event's
//! combined title + body text.

use std::sync::OnceLock;

use regex::RegexSet;

use crate::category::Category;

/// Critical patterns. Evaluated independently of any tag activation state:
/// this set fires regardless of what the user configured.
const CRITICAL_PATTERNS: &[&str] = &[
    r"suspicious (login|sign[- ]?in|activity)",
    r"unauthorized (access|transaction|login|charge)",
    r"verify (at once|immediately|your account now)",
    r"fraud(ulent)? (alert|attempt|activity|detected)",
    r"account (locked|compromised|suspended)",
    r"emergency alert",
    r"evacuat(e|ion)",
    r"\b(smoke|fire|co2|carbon monoxide) (alarm|detected)",
    r"\bsos\b",
    r"call 911",
    r"(severe weather|tornado|flash flood) warning",
    r"amber alert",
];

const SECURITY_PATTERNS: &[&str] = &[
    r"security (alert|code|notice|warning)",
    r"verification code",
    r"one[- ]time (code|password|passcode)",
    r"\botp\b",
    r"two[- ]factor",
    r"sign[- ]?in (attempt|request)",
    r"password (changed|reset|expired)",
    r"new (login|device) (from|detected)",
];

const FINANCE_PATTERNS: &[&str] = &[
    r"payment (received|due|failed|sent)",
    r"invoice",
    r"transfer(red)?",
    r"direct deposit",
    r"card (charged|declined|ending)",
    r"(low|account) balance",
    r"transaction",
    r"statement (is )?ready",
];

const EMERGENCY_PATTERNS: &[&str] = &[
    r"\bemergency\b",
    r"\burgent\b",
    r"immediate action required",
    r"critical (warning|alert)",
];

const DIRECT_CHAT_PATTERNS: &[&str] = &[
    r"sent you a (message|photo|video|voice message)",
    r"messaged you",
    r"new message from",
    r"sent a message",
    r"wants to chat",
    r"new chat request",
];

const GROUP_THREAD_PATTERNS: &[&str] = &[
    r"in the group",
    r"group (chat|conversation|call)",
    r"to the group",
    r"\d+ new messages",
    r"new messages in",
    r"joined the group",
];

const MENTION_PATTERNS: &[&str] = &[
    r"mentioned you",
    r"tagged you",
    r"replied to your",
    r"@you\b",
    r"quoted your message",
];

const CALL_PATTERNS: &[&str] = &[
    r"incoming (call|video call)",
    r"missed (call|video call|audio call)",
    r"voicemail",
    r"calling you",
];

const WORK_PATTERNS: &[&str] = &[
    r"assigned (you|to you)",
    r"\bticket\b",
    r"pull request",
    r"code review",
    r"pipeline (failed|passed|succeeded)",
    r"task (due|overdue|completed)",
    r"new comment on",
];

const MEETING_PATTERNS: &[&str] = &[
    r"\bmeeting\b",
    r"calendar (invite|event)",
    r"invited you to",
    r"event (starting|reminder)",
    r"starts in \d+ (minutes|min)",
    r"stand-?up",
];

const DOCUMENT_PATTERNS: &[&str] = &[
    r"shared (a |an )?(document|file|folder|spreadsheet) with you",
    r"commented on (your|the) (doc|document|file)",
    r"requested (access|edit access)",
    r"suggested (an edit|changes)",
];

const STORAGE_PATTERNS: &[&str] = &[
    r"storage (is )?(almost )?full",
    r"out of storage",
    r"backup (complete|completed|failed)",
    r"sync (complete|completed|failed|error)",
    r"upload (complete|completed|failed)",
];

const SMART_HOME_PATTERNS: &[&str] = &[
    r"doorbell",
    r"motion detected",
    r"camera (detected|spotted|offline)",
    r"(front|back) door",
    r"thermostat",
    r"device (offline|unresponsive)",
    r"left (unlocked|open)",
];

const HEALTH_PATTERNS: &[&str] = &[
    r"\bsteps\b",
    r"workout",
    r"heart rate",
    r"medication reminder",
    r"time to (move|stand)",
    r"activity (goal|ring)",
    r"sleep (score|report)",
];

const TRANSPORT_PATTERNS: &[&str] = &[
    r"your (driver|ride|trip)",
    r"arriving (now|soon|in \d+)",
    r"out for delivery",
    r"departure",
    r"gate [a-z]?\d+",
    r"(flight|train|bus) (delayed|cancelled|on time)",
];

const SHOPPING_PATTERNS: &[&str] = &[
    r"order (shipped|confirmed|delivered|placed)",
    r"package (delivered|arriving)",
    r"tracking number",
    r"shipment",
    r"back in stock",
    r"left in your cart",
];

const ENTERTAINMENT_PATTERNS: &[&str] = &[
    r"now (streaming|playing)",
    r"new episode",
    r"season \d+",
    r"premiere",
    r"live now",
    r"started streaming",
    r"recommended for you",
];

const NEWS_PATTERNS: &[&str] = &[
    r"breaking",
    r"headlines",
    r"top stories",
    r"news alert",
    r"daily briefing",
];

const UPDATE_PATTERNS: &[&str] = &[
    r"update (available|installed|ready)",
    r"new version",
    r"release notes",
    r"app update",
    r"system update",
    r"what's new",
];

const PROMOTION_PATTERNS: &[&str] = &[
    r"\d+% off",
    r"\bsale\b",
    r"discount",
    r"coupon",
    r"promo",
    r"limited time",
    r"free shipping",
    r"offer (ends|expires)",
    r"flash sale",
    r"today only",
];

/// Returns the pattern list for a selectable tag.
fn tag_patterns(tag: Category) -> &'static [&'static str] {
    match tag {
        Category::Critical => CRITICAL_PATTERNS,
        Category::Security => SECURITY_PATTERNS,
        Category::Finance => FINANCE_PATTERNS,
        Category::Emergency => EMERGENCY_PATTERNS,
        Category::DirectChats => DIRECT_CHAT_PATTERNS,
        Category::GroupThreads => GROUP_THREAD_PATTERNS,
        Category::Mentions => MENTION_PATTERNS,
        Category::Calls => CALL_PATTERNS,
        Category::Work => WORK_PATTERNS,
        Category::Meetings => MEETING_PATTERNS,
        Category::Documents => DOCUMENT_PATTERNS,
        Category::Storage => STORAGE_PATTERNS,
        Category::SmartHome => SMART_HOME_PATTERNS,
        Category::Health => HEALTH_PATTERNS,
        Category::Transport => TRANSPORT_PATTERNS,
        Category::Shopping => SHOPPING_PATTERNS,
        Category::Entertainment => ENTERTAINMENT_PATTERNS,
        Category::News => NEWS_PATTERNS,
        Category::Updates => UPDATE_PATTERNS,
        Category::Promotions => PROMOTION_PATTERNS,
    }
}

/// Compiled pattern sets for every tag plus the critical pseudo-category.
pub struct PatternLibrary {
    sets: Vec<(Category, RegexSet)>,
    critical: RegexSet,
}

impl PatternLibrary {
    fn build() -> Self {
        let sets = Category::priority_order()
            .iter()
            .map(|tag| (*tag, compile_set(tag_patterns(*tag))))
            .collect();

        Self {
            sets,
            critical: compile_set(CRITICAL_PATTERNS),
        }
    }

    /// Returns true iff any pattern in the tag's set matches the text.
    pub fn matches_tag(&self, tag: Category, text: &str) -> bool {
        if tag.is_critical() {
            return self.is_critical(text);
        }
        self.sets
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, set)| set.is_match(text))
            .unwrap_or(false)
    }

    /// Evaluates the critical pattern set. Independent of tag activation.
    pub fn is_critical(&self, text: &str) -> bool {
        self.critical.is_match(text)
    }

    /// Returns true iff the text carries group-conversation indicators.
    ///
    /// The group-thread set doubles as the group-indicator check used by
    /// direct-message detection.
    pub fn has_group_indicators(&self, text: &str) -> bool {
        self.matches_tag(Category::GroupThreads, text)
    }
}

fn compile_set(patterns: &[&str]) -> RegexSet {
    let case_insensitive: Vec<String> = patterns.iter().map(|p| format!("(?i){p}")).collect();
    RegexSet::new(&case_insensitive).expect("Invalid pattern set")
}

/// Returns the process-wide pattern library, built on first use.
pub fn library() -> &'static PatternLibrary {
    static LIBRARY: OnceLock<PatternLibrary> = OnceLock::new();
    LIBRARY.get_or_init(PatternLibrary::build)
}
