//! Keyword tier tables for heuristic classification.
//!
//! Priority, severity and timeframe are inferred by walking an ordered table
//! of `(tier, keywords)` pairs; the first tier with a keyword present in the
//! text wins, otherwise the table's default applies.

use lexfuse_core::{Priority, Severity, Timeframe};

/// An ordered tier table with a fallback.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTiers<T: 'static> {
    pub tiers: &'static [(T, &'static [&'static str])],
    pub default: T,
}

impl<T: Copy> KeywordTiers<T> {
    /// The first tier with a keyword in `text`, with the keyword that matched.
    #[must_use]
    pub fn matched_tier(&self, text: &str) -> Option<(T, &'static str)> {
        let lower = text.to_lowercase();
        self.tiers.iter().find_map(|(tier, keywords)| {
            keywords
                .iter()
                .find(|keyword| contains_keyword(&lower, keyword))
                .map(|keyword| (*tier, *keyword))
        })
    }

    #[must_use]
    pub fn classify(&self, text: &str) -> T {
        self.matched_tier(text).map_or(self.default, |(tier, _)| tier)
    }
}

const PRIORITY_TIERS: &[(Priority, &[&str])] = &[
    (
        Priority::High,
        &[
            "immediately",
            "urgent",
            "critical",
            "essential",
            "national security",
            "emergency",
            "highest priority",
            "without delay",
            "imminent",
        ],
    ),
    (
        Priority::Medium,
        &["promptly", "timely", "important", "necessary", "significant"],
    ),
    (
        Priority::Low,
        &[
            "may",
            "consider",
            "encourage",
            "encouraged",
            "to the extent practicable",
            "as appropriate",
            "optional",
            "voluntary",
        ],
    ),
];

const SEVERITY_TIERS: &[(Severity, &[&str])] = &[
    (
        Severity::High,
        &[
            "significant",
            "substantial",
            "major",
            "critical",
            "severe",
            "serious",
            "dramatic",
            "billion",
            "billions",
        ],
    ),
    (
        Severity::Medium,
        &[
            "moderate",
            "considerable",
            "notable",
            "meaningful",
            "million",
            "millions",
        ],
    ),
    (
        Severity::Low,
        &["minor", "minimal", "limited", "slight", "negligible", "modest"],
    ),
];

const TIMEFRAME_TIERS: &[(Timeframe, &[&str])] = &[
    (
        Timeframe::Immediate,
        &[
            "immediately",
            "immediate",
            "upon signing",
            "forthwith",
            "without delay",
        ],
    ),
    (
        Timeframe::ShortTerm,
        &[
            "short-term",
            "short term",
            "near-term",
            "near term",
            "within 30 days",
            "within 60 days",
            "within 90 days",
            "weeks",
        ],
    ),
    (
        Timeframe::MediumTerm,
        &[
            "medium-term",
            "medium term",
            "within 180 days",
            "within one year",
            "months",
            "fiscal year",
        ],
    ),
    (
        Timeframe::LongTerm,
        &[
            "long-term",
            "long term",
            "years",
            "decade",
            "decades",
            "permanent",
            "permanently",
            "future generations",
        ],
    ),
];

pub const PRIORITY: KeywordTiers<Priority> = KeywordTiers {
    tiers: PRIORITY_TIERS,
    default: Priority::Medium,
};

pub const SEVERITY: KeywordTiers<Severity> = KeywordTiers {
    tiers: SEVERITY_TIERS,
    default: Severity::Medium,
};

pub const TIMEFRAME: KeywordTiers<Timeframe> = KeywordTiers {
    tiers: TIMEFRAME_TIERS,
    default: Timeframe::MediumTerm,
};

/// Groups an impact can name as affected besides agencies and officials.
pub const STAKEHOLDER_GROUPS: &[&str] = &[
    "small businesses",
    "businesses",
    "consumers",
    "workers",
    "employers",
    "State governments",
    "tribal governments",
    "local governments",
    "contractors",
    "industry",
    "taxpayers",
    "students",
    "veterans",
    "families",
    "the public",
];

/// Whole-word (or whole-phrase) containment; `haystack` must be lowercase.
#[must_use]
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    haystack.match_indices(&keyword).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
