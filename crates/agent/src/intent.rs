use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PricingInquiry,
    ProjectHelp,
    TechnicalSupport,
    MarketingInfo,
    Greeting,
    GeneralInquiry,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Self::PricingInquiry,
        Self::ProjectHelp,
        Self::TechnicalSupport,
        Self::MarketingInfo,
        Self::Greeting,
        Self::GeneralInquiry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PricingInquiry => "pricing_inquiry",
            Self::ProjectHelp => "project_help",
            Self::TechnicalSupport => "technical_support",
            Self::MarketingInfo => "marketing_info",
            Self::Greeting => "greeting",
            Self::GeneralInquiry => "general_inquiry",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRICING_KEYWORDS: &[&str] = &[
    "price",
    "pricing",
    "cost",
    "how much",
    "quote",
    "quotation",
    "budget",
    "fees",
    "charge",
    "afford",
    "cheap",
    "expensive",
    "payment",
    "invoice",
];

const PROJECT_KEYWORDS: &[&str] = &[
    "project",
    "build",
    "develop",
    "website",
    "web app",
    "mobile app",
    "app",
    "application",
    "software",
    "platform",
    "system",
    "idea",
];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "technical",
    "support",
    "bug",
    "error",
    "issue",
    "problem",
    "not working",
    "broken",
    "crash",
    "fix",
    "login",
];

const MARKETING_KEYWORDS: &[&str] = &[
    "marketing",
    "market",
    "seo",
    "social media",
    "advertising",
    "advert",
    "ads",
    "promote",
    "promotion",
    "campaign",
    "brand",
    "audience",
    "traffic",
];

const GREETING_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "howzit",
    "good morning",
    "good afternoon",
    "good evening",
    "greetings",
    "sawubona",
    "molo",
];

/// Keyword sets in tie-break order; the first set with a hit wins.
pub const PRIORITY: [(Intent, &[&str]); 5] = [
    (Intent::PricingInquiry, PRICING_KEYWORDS),
    (Intent::ProjectHelp, PROJECT_KEYWORDS),
    (Intent::TechnicalSupport, TECHNICAL_KEYWORDS),
    (Intent::MarketingInfo, MARKETING_KEYWORDS),
    (Intent::Greeting, GREETING_KEYWORDS),
];

#[derive(Clone, Copy, Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, message: &str) -> Intent {
        classify(message)
    }
}

/// Case-insensitive substring match with punctuation folded to spaces, so
/// `costly` hits `cost` and `How...much` hits `how much`.
pub fn classify(message: &str) -> Intent {
    let normalized = normalize(message);
    PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| normalized.contains(*keyword)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::GeneralInquiry)
}

fn normalize(message: &str) -> String {
    let folded = message
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect::<String>();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
