use lexfuse_core::{
    Error, Extraction, ExtractionContext, Extractor, ImpactFact, ImpactType, KnowledgeDetails,
    KnowledgeItem, KnowledgeType, Result,
};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use super::{TITLED_ROLE, push_unique};
use crate::keywords::{SEVERITY, STAKEHOLDER_GROUPS, TIMEFRAME, contains_keyword};
use crate::patterns::{BuildError, OverlapPolicy, RuleDef, RuleMatch, RuleSet, compile_regex};
use crate::scoring::{CountBonus, SECONDARY_BONUS, aggregate_confidence, is_related};
use crate::text::{clean_clause, collapse_whitespace};

const COUNT_BONUS: CountBonus = CountBonus {
    threshold: 3,
    bonus: 0.05,
};

/// Shortest clause kept, in words.
const MIN_DESCRIPTION_WORDS: usize = 4;

/// Category keywords, in rule order.
const CATEGORIES: &[(ImpactType, &str, f32)] = &[
    (
        ImpactType::Financial,
        r"costs?|funding|budget(?:ary|s)?|fiscal|economic|spending|expenditures?|appropriations?|revenues?|tax(?:es)?|savings|financial|prices?|billions?|millions?|dollars",
        0.7,
    ),
    (
        ImpactType::Compliance,
        r"compliance|comply|regulatory|regulations?|enforcement|audits?|oversight|accountability|standards|certif(?:y|ication)",
        0.7,
    ),
    (
        ImpactType::Security,
        r"security|cybersecurity|threats?|vulnerabilit(?:y|ies)|defense|protection|attacks?|resilience",
        0.7,
    ),
    (
        ImpactType::Operational,
        r"operations|operational|efficiency|efficient|procurement|workforce|staffing|processes|modernization|implementation|infrastructure",
        0.7,
    ),
    (
        ImpactType::General,
        r"impacts?|affect(?:s|ed)?|effects?\s+on|benefits?|consequences?|burdens?",
        0.6,
    ),
];

/// Extracts statements about the consequences of a document.
#[derive(Debug, Clone)]
pub struct ImpactExtractor {
    rules: RuleSet<ImpactType>,
    titled_role: Regex,
    agency_name: Regex,
}

impl ImpactExtractor {
    /// # Errors
    /// Returns an error if a rule fails to compile.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            rules: RuleSet::compile(&Self::rule_defs(), OverlapPolicy::FirstRuleWins)?,
            titled_role: compile_regex("titled_role", TITLED_ROLE)?,
            agency_name: compile_regex(
                "agency_name",
                r"\b(?:Department[ \t]+of[ \t]+(?:the[ \t]+)?[A-Z][A-Za-z]*(?:[ \t]+and[ \t]+[A-Z][A-Za-z]*)*|(?:[A-Z][A-Za-z'-]*[ \t]+){1,5}(?:Agency|Administration|Bureau|Commission|Office|Council|Service|Board))\b",
            )?,
        })
    }

    /// One keyword-anchored clause rule per category.
    #[must_use]
    pub fn rule_defs() -> Vec<RuleDef<ImpactType>> {
        CATEGORIES
            .iter()
            .map(|(impact_type, keywords, confidence)| {
                RuleDef::new(
                    impact_type.as_str(),
                    *impact_type,
                    format!(r"[^.;\n]*\b(?i:{keywords})\b[^.;\n]*"),
                    *confidence,
                )
            })
            .collect()
    }

    fn build(&self, m: &RuleMatch<'_, ImpactType>, context: &ExtractionContext) -> Result<KnowledgeItem> {
        let description = clean_clause(m.text());
        if description.split_whitespace().count() < MIN_DESCRIPTION_WORDS {
            return Err(Error::malformed(
                KnowledgeType::Impact,
                m.text(),
                "clause too short",
            ));
        }

        let mut affected_entities = Vec::new();
        for role in self.titled_role.find_iter(&description) {
            push_unique(&mut affected_entities, collapse_whitespace(role.as_str()));
        }
        for agency in self.agency_name.find_iter(&description) {
            let name = agency.as_str();
            let name = name.strip_prefix("The ").unwrap_or(name);
            push_unique(&mut affected_entities, collapse_whitespace(name));
        }
        let lower = description.to_lowercase();
        for group in STAKEHOLDER_GROUPS {
            if contains_keyword(&lower, group) {
                push_unique(&mut affected_entities, (*group).to_string());
            }
        }

        let fact = ImpactFact {
            impact_type: m.tag,
            severity: SEVERITY.classify(&description),
            timeframe: TIMEFRAME.classify(&description),
            description,
            affected_entities,
            related_requirement_ids: Vec::new(),
        };

        Ok(KnowledgeItem::new(
            KnowledgeDetails::Impact(fact),
            context,
            collapse_whitespace(m.text()),
            m.confidence,
        ))
    }
}

impl Extractor for ImpactExtractor {
    fn kind(&self) -> KnowledgeType {
        KnowledgeType::Impact
    }

    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for m in self.rules.scan(text) {
            match self.build(&m, context) {
                Ok(item) => {
                    if seen.insert(item.identity_key()) {
                        items.push(item);
                    }
                }
                Err(err) => debug!(rule = m.rule, error = %err, "skipping impact match"),
            }
        }

        let confidence = score(&items);
        Ok(Extraction { items, confidence })
    }
}

/// Record, on every impact, the ids of the requirements it is related to.
///
/// Returns the number of impacts that gained at least one link.
pub fn link_requirements(impacts: &mut [KnowledgeItem], requirements: &[KnowledgeItem]) -> usize {
    let mut linked = 0;
    for impact in impacts.iter_mut() {
        let KnowledgeDetails::Impact(fact) = &mut impact.details else {
            continue;
        };
        let before = fact.related_requirement_ids.len();
        for requirement in requirements {
            let Some(requirement_fact) = requirement.as_requirement() else {
                continue;
            };
            if is_related(&fact.description, &requirement_fact.description)
                && !fact.related_requirement_ids.contains(&requirement.id)
            {
                fact.related_requirement_ids.push(requirement.id.clone());
            }
        }
        if fact.related_requirement_ids.len() > before {
            linked += 1;
        }
    }
    linked
}

/// Aggregate confidence of a set of impacts, including the linking bonus.
#[must_use]
pub fn score(impacts: &[KnowledgeItem]) -> f32 {
    let confidences: Vec<f32> = impacts.iter().map(|item| item.confidence).collect();
    let any_linked = impacts
        .iter()
        .filter_map(KnowledgeItem::as_impact)
        .any(|fact| !fact.related_requirement_ids.is_empty());
    let secondary = if any_linked { SECONDARY_BONUS } else { 0.0 };
    aggregate_confidence(&confidences, COUNT_BONUS, secondary)
}
