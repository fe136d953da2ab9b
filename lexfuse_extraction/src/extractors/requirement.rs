use lexfuse_core::{
    Error, Extraction, ExtractionContext, Extractor, KnowledgeDetails, KnowledgeItem,
    KnowledgeType, RequirementFact, RequirementType, Result,
};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use super::{ACTOR, CLAUSE_BODY, CLAUSE_END, MONTH, TITLED_ROLE, push_unique};
use crate::keywords::{PRIORITY, contains_keyword};
use crate::patterns::{BuildError, OverlapPolicy, RuleDef, RuleMatch, RuleSet, compile_regex};
use crate::scoring::{CountBonus, aggregate_confidence};
use crate::text::{clean_clause, collapse_whitespace, enclosing_sentence};

const GENERAL_CONFIDENCE: f32 = 0.7;

const COUNT_BONUS: CountBonus = CountBonus {
    threshold: 5,
    bonus: 0.05,
};

/// Words that can open a sentence before a modal without naming an actor.
const NON_ACTORS: &[&str] = &[
    "This", "That", "It", "Each", "Such", "These", "Those", "Any", "No", "Nothing", "All", "There",
    "Sec", "Section",
];

const CONNECTORS: &[&str] = &["of", "the", "for", "and", "on", "to"];

/// Shortest description kept, in words.
const MIN_DESCRIPTION_WORDS: usize = 3;

/// Extracts obligations: what shall, must or may not be done, and by whom.
#[derive(Debug, Clone)]
pub struct RequirementExtractor {
    rules: RuleSet<RequirementType>,
    titled_role: Regex,
    deadline_phrase: Regex,
}

impl RequirementExtractor {
    /// # Errors
    /// Returns an error if a rule fails to compile.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            rules: RuleSet::compile(&Self::rule_defs(), OverlapPolicy::FirstRuleWins)?,
            titled_role: compile_regex("titled_role", TITLED_ROLE)?,
            deadline_phrase: compile_regex(
                "deadline_phrase",
                &format!(
                    r"(?i)\b(?:within\s+(?:[a-z-]+\s+){{0,3}}\(?\d{{1,4}}\)?\s+(?:days?|weeks?|months?|years?)\b|(?:by|no\s+later\s+than|not\s+later\s+than|on\s+or\s+before|before)\s+{MONTH}[ \t]+\d{{1,2}}(?:st|nd|rd|th)?,?[ \t]+\d{{4}})"
                ),
            )?,
        })
    }

    /// The rule table. Earlier rules claim their clause before later ones.
    #[must_use]
    pub fn rule_defs() -> Vec<RuleDef<RequirementType>> {
        let subject = format!(
            r"(?:\b(?P<actor>{ACTOR})[ \t]+|\b(?:[a-z][a-z-]*[ \t]+){{1,6}})?"
        );
        let tail = format!("{CLAUSE_BODY}{CLAUSE_END}");

        vec![
            RuleDef::new(
                "prohibition",
                RequirementType::Prohibition,
                format!(
                    r"{subject}(?:(?:shall|may|must)[ \t]+not|(?:is|are)[ \t]+prohibited[ \t]+from)\b{tail}"
                ),
                0.8,
            ),
            RuleDef::new(
                "reporting",
                RequirementType::Reporting,
                format!(
                    r"{subject}(?:shall|must|will)[ \t]+(?:report\b|(?:[a-z]+[ \t]+){{0,3}}(?:submit|provide|deliver|prepare|transmit|develop)\b[^.;\n]*?\b(?:reports?|assessments?|plans?|recommendations|findings|summary|summaries|updates?)\b){tail}"
                ),
                0.85,
            ),
            RuleDef::new(
                "deadline",
                RequirementType::Deadline,
                format!(
                    r"{subject}(?:shall|must|will)\b[^.;\n]*?(?:\bwithin[ \t]+(?:[a-z-]+[ \t]+){{0,3}}\(?\d{{1,4}}\)?[ \t]+(?:days?|weeks?|months?|years?)\b|\bno[ \t]+later[ \t]+than\b|\bnot[ \t]+later[ \t]+than\b|\bby[ \t]+{MONTH}){tail}"
                ),
                0.85,
            ),
            RuleDef::new(
                "agency_action",
                RequirementType::AgencyAction,
                format!(r"\b(?P<actor>{ACTOR})[ \t]+shall\b{tail}"),
                0.8,
            ),
            RuleDef::new(
                "general",
                RequirementType::General,
                format!(
                    r"{subject}(?:must|shall|(?:is|are)[ \t]+required[ \t]+to)\b{tail}"
                ),
                GENERAL_CONFIDENCE,
            ),
        ]
    }

    fn build(
        &self,
        m: &RuleMatch<'_, RequirementType>,
        text: &str,
        context: &ExtractionContext,
    ) -> Result<KnowledgeItem> {
        let description = clean_clause(m.text());
        if description.split_whitespace().count() < MIN_DESCRIPTION_WORDS {
            return Err(Error::malformed(
                KnowledgeType::Requirement,
                m.text(),
                "clause too short",
            ));
        }

        let actor = m.group("actor").and_then(clean_actor);
        let (requirement_type, confidence) =
            if m.tag == RequirementType::AgencyAction && actor.is_none() {
                (RequirementType::General, GENERAL_CONFIDENCE)
            } else {
                (m.tag, m.confidence)
            };

        let mut target_entities = Vec::new();
        if let Some(actor) = actor {
            push_unique(&mut target_entities, actor);
        }
        for role in self.titled_role.find_iter(m.text()) {
            push_unique(&mut target_entities, collapse_whitespace(role.as_str()));
        }

        let clause_lower = m.text().to_lowercase();
        let is_conditional =
            contains_keyword(&clause_lower, "if") || contains_keyword(&clause_lower, "when");
        let sentence = enclosing_sentence(text, m.span.start);
        let deadline = self
            .deadline_phrase
            .find(sentence)
            .map(|found| collapse_whitespace(found.as_str()));

        let fact = RequirementFact {
            requirement_type,
            priority: PRIORITY.classify(&description),
            description,
            target_entities,
            is_conditional,
            deadline,
        };

        Ok(KnowledgeItem::new(
            KnowledgeDetails::Requirement(fact),
            context,
            collapse_whitespace(m.text()),
            confidence,
        ))
    }
}

impl Extractor for RequirementExtractor {
    fn kind(&self) -> KnowledgeType {
        KnowledgeType::Requirement
    }

    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for m in self.rules.scan(text) {
            match self.build(&m, text, context) {
                Ok(item) => {
                    if seen.insert(item.identity_key()) {
                        items.push(item);
                    }
                }
                Err(err) => debug!(rule = m.rule, error = %err, "skipping requirement match"),
            }
        }

        let confidences: Vec<f32> = items.iter().map(|item| item.confidence).collect();
        let confidence = aggregate_confidence(&confidences, COUNT_BONUS, 0.0);
        Ok(Extraction { items, confidence })
    }
}

/// Strip the leading article and trailing connectors from a captured actor.
///
/// Returns `None` for sentence openers that do not name anyone.
fn clean_actor(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    if words.first().is_some_and(|w| w.eq_ignore_ascii_case("the")) {
        words.remove(0);
    }
    while words.last().is_some_and(|w| CONNECTORS.contains(w)) {
        words.pop();
    }

    let first = words.first()?;
    if NON_ACTORS.contains(first) {
        return None;
    }
    Some(words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexfuse_core::Priority;

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn requirements(text: &str) -> Vec<RequirementFact> {
        let extractor = RequirementExtractor::new().expect("requirement rules should compile");
        let context = ExtractionContext::new("test", "Test Source");
        extractor
            .extract(text, &context)
            .expect("extraction should succeed")
            .items
            .iter()
            .filter_map(KnowledgeItem::as_requirement)
            .cloned()
            .collect()
    }

    #[test]
    fn reporting_with_actor_and_deadline() {
        let found = requirements(
            "The Secretary of Energy shall submit a report to Congress by March 1, 2025.",
        );
        assert_eq!(found.len(), 1);
        let requirement = &found[0];
        assert_eq!(requirement.requirement_type, RequirementType::Reporting);
        assert_eq!(requirement.target_entities, vec!["Secretary of Energy"]);
        assert_eq!(requirement.deadline.as_deref(), Some("by March 1, 2025"));
        assert_eq!(requirement.priority, Priority::Medium);
        assert!(!requirement.is_conditional);
    }

    #[test]
    fn prohibition_wins_over_later_rules() {
        let found = requirements("Agencies shall not use appropriated funds for this purpose.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].requirement_type, RequirementType::Prohibition);
        assert_eq!(found[0].target_entities, vec!["Agencies"]);
    }

    #[test]
    fn deadline_clause() {
        let found = requirements("Agencies shall complete the review within 60 days.");
        assert_eq!(found[0].requirement_type, RequirementType::Deadline);
        assert_eq!(found[0].deadline.as_deref(), Some("within 60 days"));
    }

    #[test]
    fn agency_action_with_high_priority() {
        let found =
            requirements("The Attorney General shall immediately review all pending cases.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].requirement_type, RequirementType::AgencyAction);
        assert_eq!(found[0].target_entities, vec!["Attorney General"]);
        assert_eq!(found[0].priority, Priority::High);
    }

    #[test]
    fn pronoun_actor_becomes_general() {
        let found = requirements("It shall be the policy of the United States to protect data.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].requirement_type, RequirementType::General);
        assert!(found[0].target_entities.is_empty());
    }

    #[test]
    fn conditional_clause() {
        let found = requirements(
            "the agency shall rescind the rule when it is found to be unlawful.",
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].is_conditional);
        assert_eq!(found[0].requirement_type, RequirementType::General);
    }

    #[test]
    fn condition_in_neighbouring_clause_does_not_leak() {
        let found = requirements(
            "Agencies shall publish guidance on procurement; if a rule is unlawful, the agency shall rescind it.",
        );
        let guidance = found
            .iter()
            .find(|requirement| requirement.description.contains("guidance"));
        assert!(guidance.is_some_and(|requirement| !requirement.is_conditional));
        assert!(
            found
                .iter()
                .filter(|requirement| requirement.is_conditional)
                .all(|requirement| contains_keyword(&requirement.description.to_lowercase(), "if"))
        );
    }

    #[test]
    fn repeated_clause_is_kept_once() {
        let found = requirements(
            "Agencies must publish guidance. Agencies must publish guidance.",
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn actor_cleanup() {
        assert_eq!(
            clean_actor("The Secretary of Energy"),
            Some("Secretary of Energy".to_string())
        );
        assert_eq!(clean_actor("Secretary of"), Some("Secretary".to_string()));
        assert_eq!(clean_actor("This"), None);
        assert_eq!(clean_actor("the"), None);
    }
}
