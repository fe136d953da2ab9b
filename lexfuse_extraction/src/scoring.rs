use lexfuse_core::{BASE_CONFIDENCE, MAX_CONFIDENCE};
use std::collections::HashSet;

/// Bonus added for each secondary signal an extractor recognizes.
pub const SECONDARY_BONUS: f32 = 0.05;

/// Minimum keyword overlap above which two clauses count as related.
pub const RELATED_OVERLAP_THRESHOLD: f64 = 0.3;

/// Per-type count bonus: `bonus` is added once `count >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountBonus {
    pub threshold: usize,
    pub bonus: f32,
}

/// Aggregate confidence of one extraction run.
///
/// Formula: `avg(item confidences) + count bonus + secondary`, capped at
/// [`MAX_CONFIDENCE`]. With no items the result is exactly
/// [`BASE_CONFIDENCE`].
#[must_use]
pub fn aggregate_confidence(item_confidences: &[f32], count_bonus: CountBonus, secondary: f32) -> f32 {
    if item_confidences.is_empty() {
        return BASE_CONFIDENCE;
    }

    let average = item_confidences.iter().sum::<f32>() / item_confidences.len() as f32;
    let mut confidence = average + secondary;
    if item_confidences.len() >= count_bonus.threshold {
        confidence += count_bonus.bonus;
    }

    confidence.clamp(BASE_CONFIDENCE, MAX_CONFIDENCE)
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "from", "such", "shall", "must", "will", "may",
    "any", "all", "each", "its", "their", "other", "order", "section", "which", "been", "into",
    "under", "within", "than", "not", "are", "was", "were", "has", "have", "had", "by", "of", "to",
    "in", "on", "or", "as", "an", "be", "is", "it", "also", "these", "those", "including",
];

/// Lowercased content words of `text`: alphanumeric tokens of at least three
/// characters, minus stop-words.
#[must_use]
pub fn keyword_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
        .collect()
}

/// Share of keywords two clauses have in common, relative to the clause with
/// fewer keywords.
///
/// Returns 0.0 if either clause has no keywords.
#[must_use]
pub fn keyword_overlap(a: &str, b: &str) -> f64 {
    let keywords_a = keyword_set(a);
    let keywords_b = keyword_set(b);

    let smaller = keywords_a.len().min(keywords_b.len());
    if smaller == 0 {
        return 0.0;
    }

    let shared = keywords_a.intersection(&keywords_b).count();
    shared as f64 / smaller as f64
}

/// Whether two clauses are lexically related.
#[must_use]
pub fn is_related(a: &str, b: &str) -> bool {
    keyword_overlap(a, b) > RELATED_OVERLAP_THRESHOLD
}
