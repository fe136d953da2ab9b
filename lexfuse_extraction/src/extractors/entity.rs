use lexfuse_core::util::normalize_name;
use lexfuse_core::{
    EntityFact, EntityType, Extraction, ExtractionContext, Extractor, KnowledgeDetails,
    KnowledgeItem, KnowledgeType, Result,
};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::trace;

use super::{TITLED_ROLE, push_unique};
use crate::keywords::contains_keyword;
use crate::patterns::{BuildError, OverlapPolicy, RuleDef, RuleSet};
use crate::scoring::{CountBonus, SECONDARY_BONUS, aggregate_confidence};
use crate::text::{collapse_whitespace, sentences};

const COUNT_BONUS: CountBonus = CountBonus {
    threshold: 5,
    bonus: 0.05,
};

/// The fifteen executive departments, as they follow "Department of".
pub const CABINET_DEPARTMENTS: &[&str] = &[
    "State",
    "the Treasury",
    "Defense",
    "Justice",
    "the Interior",
    "Agriculture",
    "Commerce",
    "Labor",
    "Health and Human Services",
    "Housing and Urban Development",
    "Transportation",
    "Energy",
    "Education",
    "Veterans Affairs",
    "Homeland Security",
];

const AGENCY_SUFFIXES: &str = r"Agency|Administration|Bureau|Commission|Office|Council|Service|Board|Authority|Corps|Institute|Foundation";

/// Optional parenthetical short name, e.g. `(DOE)` or `(the "Council")`.
const ALIAS: &str = r#"(?:[ \t]*\((?:the[ \t]+)?["“]?(?P<alias>[A-Z][A-Za-z&.' -]{0,30}?)["”]?\))?"#;

const PROPER_NAME: &str = r"[A-Z][A-Za-z'-]*(?:[ \t]+(?:(?:on|of|for|and|to)[ \t]+(?:the[ \t]+)?)?[A-Z][A-Za-z'-]*)*";

const MODALS: &[&str] = &["shall", "must", "will"];

/// Extracts departments, agencies, officials and newly created bodies.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    rules: RuleSet<EntityType>,
}

impl EntityExtractor {
    /// # Errors
    /// Returns an error if a rule fails to compile.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            rules: RuleSet::compile(&Self::rule_defs(), OverlapPolicy::KeepAll)?,
        })
    }

    #[must_use]
    pub fn rule_defs() -> Vec<RuleDef<EntityType>> {
        let departments = CABINET_DEPARTMENTS
            .iter()
            .map(|name| name.replace(' ', r"[ \t]+"))
            .collect::<Vec<_>>()
            .join("|");

        vec![
            RuleDef::new(
                "cabinet_department",
                EntityType::Department,
                format!(
                    r"\b(?:[Tt]he[ \t]+)?(?P<name>Department[ \t]+of[ \t]+(?:{departments}))\b{ALIAS}"
                ),
                0.9,
            ),
            RuleDef::new(
                "created_body",
                EntityType::CreatedBody,
                format!(
                    r"\b(?:establish(?:es|ed)?|creat(?:es|ed|e))[ \t]+(?:within[ \t]+[^,.;\n]{{1,80}}[ \t]+)?(?:an?|the)[ \t]+(?P<name>{PROPER_NAME}){ALIAS}"
                ),
                0.85,
            ),
            RuleDef::new(
                "titled_role",
                EntityType::Official,
                format!(r"\b(?P<name>{TITLED_ROLE})"),
                0.8,
            ),
            RuleDef::new(
                "agency",
                EntityType::Agency,
                format!(
                    r"\b[Tt]he[ \t]+(?P<name>(?:[A-Z][A-Za-z'-]*[ \t]+(?:(?:and|of|for|on)[ \t]+)?){{1,6}}(?:{AGENCY_SUFFIXES})\b(?:[ \t]+of[ \t]+the[ \t]+[A-Z][A-Za-z'-]*(?:[ \t]+[A-Z][A-Za-z'-]*)*)?|(?:Office|Bureau|Council|Board|Commission)[ \t]+(?:of|for|on)[ \t]+(?:the[ \t]+)?[A-Z][A-Za-z'-]*(?:[ \t]+(?:(?:and|of|for)[ \t]+)?[A-Z][A-Za-z'-]*)*){ALIAS}"
                ),
                0.75,
            ),
        ]
    }
}

struct Candidate {
    fact: EntityFact,
    evidence: String,
    confidence: f32,
}

impl Extractor for EntityExtractor {
    fn kind(&self) -> KnowledgeType {
        KnowledgeType::Entity
    }

    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for m in self.rules.scan(text) {
            let Some(name) = m.group("name").map(collapse_whitespace) else {
                continue;
            };
            let alias = m
                .group("alias")
                .map(|alias| collapse_whitespace(alias.trim()))
                .filter(|alias| *alias != name);
            let key = normalize_name(&name);

            if let Some(&position) = index.get(&key) {
                trace!(rule = m.rule, name = %name, "merging repeated entity");
                if let Some(alias) = alias {
                    push_unique(&mut candidates[position].fact.aliases, alias);
                }
                continue;
            }

            index.insert(key, candidates.len());
            candidates.push(Candidate {
                fact: EntityFact {
                    name,
                    entity_type: m.tag,
                    aliases: alias.into_iter().collect(),
                    responsibilities: Vec::new(),
                },
                evidence: collapse_whitespace(m.text()),
                confidence: m.confidence,
            });
        }

        let obligations: Vec<(String, String)> = sentences(text)
            .into_iter()
            .map(|sentence| (sentence.to_lowercase(), collapse_whitespace(sentence)))
            .filter(|(lower, _)| MODALS.iter().any(|modal| contains_keyword(lower, modal)))
            .collect();

        candidates.par_iter_mut().for_each(|candidate| {
            let needle = candidate.fact.name.to_lowercase();
            for (lower, sentence) in &obligations {
                if lower.contains(&needle) {
                    push_unique(&mut candidate.fact.responsibilities, sentence.clone());
                }
            }
        });

        let any_responsibilities = candidates
            .iter()
            .any(|candidate| !candidate.fact.responsibilities.is_empty());
        let items: Vec<KnowledgeItem> = candidates
            .into_iter()
            .map(|candidate| {
                KnowledgeItem::new(
                    KnowledgeDetails::Entity(candidate.fact),
                    context,
                    candidate.evidence,
                    candidate.confidence,
                )
            })
            .collect();

        let confidences: Vec<f32> = items.iter().map(|item| item.confidence).collect();
        let secondary = if any_responsibilities { SECONDARY_BONUS } else { 0.0 };
        let confidence = aggregate_confidence(&confidences, COUNT_BONUS, secondary);
        Ok(Extraction { items, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn entities(text: &str) -> Extraction {
        EntityExtractor::new()
            .expect("entity rules should compile")
            .extract(text, &ExtractionContext::new("test", "Test Source"))
            .expect("extraction should succeed")
    }

    fn facts(extraction: &Extraction) -> Vec<EntityFact> {
        extraction
            .items
            .iter()
            .filter_map(KnowledgeItem::as_entity)
            .cloned()
            .collect()
    }

    #[test]
    fn repeated_department_merges_alias_and_responsibilities() {
        let extraction = entities(
            "The Department of Energy shall lead the effort. \
             The Department of Energy (DOE) shall coordinate with the Secretary of State.",
        );
        let found = facts(&extraction);
        assert_eq!(found.len(), 2);

        let department = &found[0];
        assert_eq!(department.name, "Department of Energy");
        assert_eq!(department.entity_type, EntityType::Department);
        assert_eq!(department.aliases, vec!["DOE"]);
        assert_eq!(department.responsibilities.len(), 2);

        assert_eq!(found[1].name, "Secretary of State");
        assert_eq!(found[1].entity_type, EntityType::Official);

        // avg(0.9, 0.8) + responsibilities bonus
        assert!((extraction.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn created_body_with_quoted_alias() {
        let found = facts(&entities(
            "This order establishes the Task Force on Supply Chain Resilience (\"SCR Task Force\").",
        ));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Task Force on Supply Chain Resilience");
        assert_eq!(found[0].entity_type, EntityType::CreatedBody);
        assert_eq!(found[0].aliases, vec!["SCR Task Force"]);
    }

    #[test]
    fn officials_and_agencies_in_text_order() {
        let found = facts(&entities(
            "The Director of the Office of Management and Budget and the Federal Trade Commission (FTC) will review rules.",
        ));
        let summary: Vec<(&str, EntityType)> = found
            .iter()
            .map(|fact| (fact.name.as_str(), fact.entity_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Director of the Office of Management and Budget", EntityType::Official),
                ("Office of Management and Budget", EntityType::Agency),
                ("Federal Trade Commission", EntityType::Agency),
            ]
        );
        assert_eq!(found[2].aliases, vec!["FTC"]);
        assert!(found.iter().all(|fact| fact.responsibilities.len() == 1));
    }

    #[test]
    fn every_department_is_recognized() {
        for department in CABINET_DEPARTMENTS {
            let text = format!("the Department of {department} issued guidance");
            let found = facts(&entities(&text));
            assert_eq!(found.len(), 1, "department '{department}'");
            assert_eq!(found[0].name, format!("Department of {department}"));
        }
    }
}
