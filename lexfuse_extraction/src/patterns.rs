//! Pattern-rule tables shared by every extractor.
//!
//! Each extractor declares its rules as data: a name, a discriminator tag, a
//! regex and the confidence an item built from that rule starts with. The
//! table is compiled once into a [`RuleSet`] and scanned with a single loop,
//! so the rules themselves can be inspected and tested without running an
//! extractor.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::trace;

/// Error type for rule-table compilation.
#[derive(Debug)]
pub enum BuildError {
    /// The regex pattern is invalid.
    Regex { rule: String, message: String },

    /// The starting confidence is outside `[0, 1]`.
    Confidence { rule: String, value: f32 },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regex { rule, message } => write!(f, "invalid regex in rule '{rule}': {message}"),
            Self::Confidence { rule, value } => {
                write!(f, "confidence {value} of rule '{rule}' is outside [0, 1]")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Declarative definition of a single rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef<T> {
    /// Unique name, used in logs and tests.
    pub name: String,

    /// Discriminator the extractor's post-processing dispatches on.
    pub tag: T,

    /// Regex matched against the text.
    pub pattern: String,

    /// Confidence of an item produced by this rule.
    pub confidence: f32,
}

impl<T: Copy> RuleDef<T> {
    #[must_use]
    pub fn new(name: impl Into<String>, tag: T, pattern: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            tag,
            pattern: pattern.into(),
            confidence,
        }
    }

    /// Compile into a [`PatternRule`].
    ///
    /// # Errors
    /// Returns an error if the regex is invalid or the confidence is out of range.
    pub fn build(&self) -> Result<PatternRule<T>, BuildError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(BuildError::Confidence {
                rule: self.name.clone(),
                value: self.confidence,
            });
        }
        let regex = Regex::new(&self.pattern).map_err(|e| BuildError::Regex {
            rule: self.name.clone(),
            message: e.to_string(),
        })?;

        Ok(PatternRule {
            name: self.name.clone(),
            tag: self.tag,
            regex,
            confidence: self.confidence,
        })
    }
}

/// Compile a helper regex that is not part of a rule table.
///
/// # Errors
/// Returns an error naming `name` if the pattern is invalid.
pub fn compile_regex(name: &str, pattern: &str) -> Result<Regex, BuildError> {
    Regex::new(pattern).map_err(|e| BuildError::Regex {
        rule: name.to_string(),
        message: e.to_string(),
    })
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct PatternRule<T> {
    pub name: String,
    pub tag: T,
    pub regex: Regex,
    pub confidence: f32,
}

/// How matches of different rules that cover the same text are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// A match overlapping a span claimed by an earlier rule is dropped.
    FirstRuleWins,
    /// Every match is kept; callers deduplicate by content.
    KeepAll,
}

/// One rule match, borrowing the scanned text.
#[derive(Debug)]
pub struct RuleMatch<'t, T> {
    pub rule: &'t str,
    pub tag: T,
    pub confidence: f32,
    pub captures: Captures<'t>,
    pub span: Range<usize>,
}

impl<'t, T> RuleMatch<'t, T> {
    /// The whole matched text.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.captures.get(0).map_or("", |m| m.as_str())
    }

    /// A named capture group, if it participated in the match.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&'t str> {
        self.captures.name(name).map(|m| m.as_str())
    }
}

/// An ordered, compiled rule table.
#[derive(Debug, Clone)]
pub struct RuleSet<T> {
    rules: Vec<PatternRule<T>>,
    policy: OverlapPolicy,
}

impl<T: Copy> RuleSet<T> {
    /// Compile rule definitions, keeping their order.
    ///
    /// # Errors
    /// Returns the first rule that fails to build.
    pub fn compile(defs: &[RuleDef<T>], policy: OverlapPolicy) -> Result<Self, BuildError> {
        let rules = defs
            .iter()
            .map(RuleDef::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, policy })
    }

    #[must_use]
    pub fn rules(&self) -> &[PatternRule<T>] {
        &self.rules
    }

    /// Scan `text` with every rule in table order.
    ///
    /// Matches are returned in text order; matches starting at the same
    /// offset keep table order. Empty matches are ignored.
    pub fn scan<'t>(&'t self, text: &'t str) -> Vec<RuleMatch<'t, T>> {
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut matches: Vec<(usize, RuleMatch<'t, T>)> = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            for captures in rule.regex.captures_iter(text) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                if whole.is_empty() {
                    continue;
                }
                let span = whole.range();

                if self.policy == OverlapPolicy::FirstRuleWins {
                    if claimed.iter().any(|c| overlaps(c, &span)) {
                        trace!(rule = %rule.name, start = span.start, "match overlaps a claimed span, skipping");
                        continue;
                    }
                    claimed.push(span.clone());
                }

                matches.push((
                    index,
                    RuleMatch {
                        rule: &rule.name,
                        tag: rule.tag,
                        confidence: rule.confidence,
                        captures,
                        span,
                    },
                ));
            }
        }

        matches.sort_by_key(|(index, m)| (m.span.start, *index));
        matches.into_iter().map(|(_, m)| m).collect()
    }
}

const fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Specific,
        Generic,
    }

    fn defs() -> Vec<RuleDef<Tag>> {
        vec![
            RuleDef::new("specific", Tag::Specific, r"by (\d{4})", 0.9),
            RuleDef::new("generic", Tag::Generic, r"\d{4}", 0.5),
        ]
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn first_rule_wins_drops_overlapping_matches() {
        let rules = RuleSet::compile(&defs(), OverlapPolicy::FirstRuleWins)
            .expect("rules should compile");
        let matches = rules.scan("in 2023 and by 2025");

        let tags: Vec<Tag> = matches.iter().map(|m| m.tag).collect();
        assert_eq!(tags, vec![Tag::Generic, Tag::Specific]);
        assert_eq!(matches[1].text(), "by 2025");
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn keep_all_reports_every_match_in_text_order() {
        let rules =
            RuleSet::compile(&defs(), OverlapPolicy::KeepAll).expect("rules should compile");
        let matches = rules.scan("by 2025");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].rule, "specific");
        assert_eq!(matches[1].rule, "generic");
    }

    #[test]
    fn invalid_regex_is_reported_with_rule_name() {
        let bad = vec![RuleDef::new("broken", Tag::Generic, r"(unclosed", 0.5)];
        let err = RuleSet::compile(&bad, OverlapPolicy::KeepAll);
        assert!(matches!(err, Err(BuildError::Regex { rule, .. }) if rule == "broken"));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let bad = vec![RuleDef::new("greedy", Tag::Generic, r"x", 1.5)];
        assert!(matches!(
            RuleSet::compile(&bad, OverlapPolicy::KeepAll),
            Err(BuildError::Confidence { .. })
        ));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn rule_def_serialization() {
        let def = RuleDef::new("test", "tag", r"test", 0.5);
        let json = serde_json::to_string(&def).expect("rule should serialize");
        assert!(json.contains("\"pattern\":\"test\""));
    }
}
