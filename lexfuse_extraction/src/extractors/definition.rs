use lexfuse_core::{
    DefinitionFact, DefinitionScope, Extraction, ExtractionContext, Extractor, KnowledgeDetails,
    KnowledgeItem, KnowledgeType, Result, normalize_text,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

use super::{CLAUSE_BODY, CLAUSE_END};
use crate::patterns::{BuildError, OverlapPolicy, RuleDef, RuleSet, compile_regex};
use crate::scoring::{CountBonus, aggregate_confidence};
use crate::text::{clean_clause, collapse_whitespace};

const GLOBAL_CONFIDENCE: f32 = 0.9;
const LOCAL_CONFIDENCE: f32 = 0.8;

const COUNT_BONUS: CountBonus = CountBonus {
    threshold: 3,
    bonus: 0.05,
};

/// How a definition is phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionForm {
    /// `"term" means X`
    Means,
    /// `"term" refers to X`
    RefersTo,
    /// `"term" has the meaning given in X`
    HasMeaning,
    /// `the term term means X`
    TermPhrase,
}

const QUOTED_TERM: &str = r#"["“](?P<term>[^"”\n]{1,80})["”]"#;

/// Extracts defined terms and whether they apply to the whole document.
#[derive(Debug, Clone)]
pub struct DefinitionExtractor {
    rules: RuleSet<DefinitionForm>,
    section_heading: Regex,
    section_start: Regex,
}

impl DefinitionExtractor {
    /// # Errors
    /// Returns an error if a rule fails to compile.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            rules: RuleSet::compile(&Self::rule_defs(), OverlapPolicy::FirstRuleWins)?,
            section_heading: compile_regex(
                "definitions_heading",
                r"(?m)^[ \t]*(?:Sec(?:tion)?\.?[ \t]*\d+\.[ \t]*)?Definitions?\b[.:]?",
            )?,
            section_start: compile_regex("section_heading", r"(?m)^[ \t]*Sec(?:tion)?\.?[ \t]*\d+\.")?,
        })
    }

    #[must_use]
    pub fn rule_defs() -> Vec<RuleDef<DefinitionForm>> {
        let definition = format!("(?P<definition>{CLAUSE_BODY}){CLAUSE_END}");
        vec![
            RuleDef::new(
                "means",
                DefinitionForm::Means,
                format!(r"{QUOTED_TERM}[ \t]*,?[ \t]*(?:means|shall[ \t]+mean)[ \t]+{definition}"),
                GLOBAL_CONFIDENCE,
            ),
            RuleDef::new(
                "refers_to",
                DefinitionForm::RefersTo,
                format!(
                    r"{QUOTED_TERM}[ \t]*,?[ \t]*(?:refers|shall[ \t]+refer)[ \t]+to[ \t]+{definition}"
                ),
                GLOBAL_CONFIDENCE,
            ),
            RuleDef::new(
                "has_meaning",
                DefinitionForm::HasMeaning,
                format!(
                    r"{QUOTED_TERM}[ \t]*,?[ \t]*(?P<definition>(?:has|shall[ \t]+have)[ \t]+the[ \t]+(?:same[ \t]+)?meaning{CLAUSE_BODY}){CLAUSE_END}"
                ),
                GLOBAL_CONFIDENCE,
            ),
            RuleDef::new(
                "term_phrase",
                DefinitionForm::TermPhrase,
                format!(
                    r"\b[Tt]he[ \t]+term[ \t]+(?P<term>[A-Za-z][A-Za-z -]{{0,60}}?)[ \t]+(?:means|refers[ \t]+to)[ \t]+{definition}"
                ),
                GLOBAL_CONFIDENCE,
            ),
        ]
    }

    /// Byte ranges covered by "Definitions" sections.
    fn definition_sections(&self, text: &str) -> Vec<Range<usize>> {
        self.section_heading
            .find_iter(text)
            .map(|heading| {
                let end = self
                    .section_start
                    .find_at(text, heading.end())
                    .map_or(text.len(), |next| next.start());
                heading.end()..end
            })
            .collect()
    }
}

impl Extractor for DefinitionExtractor {
    fn kind(&self) -> KnowledgeType {
        KnowledgeType::Definition
    }

    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction> {
        let sections = self.definition_sections(text);
        let mut seen = HashSet::new();
        let mut found: Vec<(DefinitionFact, String, f32)> = Vec::new();

        for m in self.rules.scan(text) {
            let term = m
                .group("term")
                .map(|term| collapse_whitespace(term.trim_end_matches([',', ' '])))
                .unwrap_or_default();
            let definition = m.group("definition").map(clean_clause).unwrap_or_default();
            if term.is_empty() || definition.is_empty() {
                debug!(rule = m.rule, text = m.text(), "skipping empty definition");
                continue;
            }
            if !seen.insert(normalize_text(&term)) {
                continue;
            }

            let global = sections
                .iter()
                .any(|section| section.contains(&m.span.start));
            let (scope, confidence) = if global {
                (DefinitionScope::Global, GLOBAL_CONFIDENCE)
            } else {
                (DefinitionScope::Local, LOCAL_CONFIDENCE)
            };

            found.push((
                DefinitionFact {
                    term,
                    definition,
                    scope,
                    related_terms: Vec::new(),
                },
                collapse_whitespace(m.text()),
                confidence,
            ));
        }

        let terms: Vec<String> = found.iter().map(|(fact, _, _)| fact.term.clone()).collect();
        for (fact, _, _) in &mut found {
            fact.related_terms = terms
                .iter()
                .filter(|other| **other != fact.term && fact.definition.contains(other.as_str()))
                .cloned()
                .collect();
        }

        let items: Vec<KnowledgeItem> = found
            .into_iter()
            .map(|(fact, evidence, confidence)| {
                KnowledgeItem::new(KnowledgeDetails::Definition(fact), context, evidence, confidence)
            })
            .collect();

        let confidences: Vec<f32> = items.iter().map(|item| item.confidence).collect();
        let confidence = aggregate_confidence(&confidences, COUNT_BONUS, 0.0);
        Ok(Extraction { items, confidence })
    }
}
