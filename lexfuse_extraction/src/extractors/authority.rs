use lexfuse_core::{
    AuthorityFact, AuthorityType, Error, Extraction, ExtractionContext, Extractor,
    KnowledgeDetails, KnowledgeItem, KnowledgeType, Result, normalize_text,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::patterns::{BuildError, OverlapPolicy, RuleDef, RuleMatch, RuleSet};
use crate::scoring::{CountBonus, SECONDARY_BONUS, aggregate_confidence};
use crate::text::collapse_whitespace;

const COUNT_BONUS: CountBonus = CountBonus {
    threshold: 2,
    bonus: 0.05,
};

/// Which citation form a rule recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityRule {
    Presidential,
    ConstitutionArticle,
    ConstitutionAmendment,
    UsCodeSection,
    UsCode,
    PublicLaw,
    Statute,
    General,
}

impl AuthorityRule {
    #[must_use]
    pub const fn authority_type(self) -> AuthorityType {
        match self {
            Self::Presidential => AuthorityType::Presidential,
            Self::ConstitutionArticle | Self::ConstitutionAmendment => AuthorityType::Constitution,
            Self::UsCodeSection | Self::UsCode => AuthorityType::UsCode,
            Self::PublicLaw => AuthorityType::PublicLaw,
            Self::Statute => AuthorityType::Statute,
            Self::General => AuthorityType::General,
        }
    }
}

const ORDINALS: [&str; 27] = [
    "First",
    "Second",
    "Third",
    "Fourth",
    "Fifth",
    "Sixth",
    "Seventh",
    "Eighth",
    "Ninth",
    "Tenth",
    "Eleventh",
    "Twelfth",
    "Thirteenth",
    "Fourteenth",
    "Fifteenth",
    "Sixteenth",
    "Seventeenth",
    "Eighteenth",
    "Nineteenth",
    "Twentieth",
    "Twenty-First",
    "Twenty-Second",
    "Twenty-Third",
    "Twenty-Fourth",
    "Twenty-Fifth",
    "Twenty-Sixth",
    "Twenty-Seventh",
];

const PRESIDENTIAL_CITATION: &str = "Constitution and laws of the United States";
const PRESIDENTIAL_DESCRIPTION: &str =
    "Presidential authority vested by the Constitution and the laws of the United States";

/// Extracts the legal authorities a document invokes.
#[derive(Debug, Clone)]
pub struct AuthorityExtractor {
    rules: RuleSet<AuthorityRule>,
}

impl AuthorityExtractor {
    /// # Errors
    /// Returns an error if a rule fails to compile.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            rules: RuleSet::compile(&Self::rule_defs(), OverlapPolicy::FirstRuleWins)?,
        })
    }

    #[must_use]
    pub fn rule_defs() -> Vec<RuleDef<AuthorityRule>> {
        let ordinals = ORDINALS.join("|");
        vec![
            RuleDef::new(
                "presidential",
                AuthorityRule::Presidential,
                r"(?i)\bby\s+the\s+authority\s+vested\s+in\s+me\s+as\s+President\s+by\s+the\s+Constitution\s+and\s+the\s+laws\s+of\s+the\s+United\s+States(?:\s+of\s+America)?",
                0.9,
            ),
            RuleDef::new(
                "constitution_article",
                AuthorityRule::ConstitutionArticle,
                r"\b[Aa]rticle\s+(?P<article>[IVX]+)(?:,?\s+(?:[Ss]ection|§)\s*(?P<section>\d+))?,?\s+of\s+the\s+(?:United\s+States\s+)?Constitution\b",
                0.9,
            ),
            RuleDef::new(
                "constitution_amendment",
                AuthorityRule::ConstitutionAmendment,
                format!(
                    r"\b(?P<ordinal>(?i:{ordinals}))\s+Amendment(?:\s+to\s+the\s+(?:United\s+States\s+)?Constitution)?\b"
                ),
                0.9,
            ),
            RuleDef::new(
                "us_code_section",
                AuthorityRule::UsCodeSection,
                r"(?i)\bsection\s+(?P<section>\d+[a-z]?)\s+of\s+title\s+(?P<title>\d{1,2}),?\s+United\s+States\s+Code",
                0.9,
            ),
            RuleDef::new(
                "us_code",
                AuthorityRule::UsCode,
                r"\b(?P<title>\d{1,2})\s+U\.\s?S\.\s?C\.?\s+(?:§+\s*)?(?P<section>\d+[a-z]?(?:-\d+)?)",
                0.9,
            ),
            RuleDef::new(
                "public_law",
                AuthorityRule::PublicLaw,
                r"\b(?:Public\s+Law|Pub\.\s*L\.)\s*(?:No\.\s*)?(?P<number>\d{2,3}-\d{1,4})\b",
                0.85,
            ),
            RuleDef::new(
                "statute",
                AuthorityRule::Statute,
                r"\b[Ss]ection\s+(?P<section>\d+[a-z]?(?:\([A-Za-z0-9]+\))*)\s+of\s+the\s+(?P<act>[A-Z][A-Za-z'.-]*(?:\s+(?:(?:of|and|the|for|on|to)\s+)*[A-Z][A-Za-z'.-]*)*\s+Act(?:\s+of\s+\d{4})?)",
                0.8,
            ),
            RuleDef::new(
                "general",
                AuthorityRule::General,
                r"(?i)\bpursuant\s+to\s+(?P<basis>[^,;.\n]{3,120})",
                0.6,
            ),
        ]
    }

    /// Canonical `(citation, description)` for a match.
    fn format(m: &RuleMatch<'_, AuthorityRule>) -> Result<(String, String)> {
        let malformed = |reason: &str| Error::malformed(KnowledgeType::Authority, m.text(), reason);
        let group = |name: &str| {
            m.group(name)
                .map(collapse_whitespace)
                .ok_or_else(|| malformed(name))
        };

        match m.tag {
            AuthorityRule::Presidential => Ok((
                PRESIDENTIAL_CITATION.to_string(),
                PRESIDENTIAL_DESCRIPTION.to_string(),
            )),
            AuthorityRule::ConstitutionArticle => {
                let article = group("article")?;
                Ok(match m.group("section") {
                    Some(section) => (
                        format!("U.S. Const. art. {article}, § {section}"),
                        format!(
                            "Article {article}, Section {section} of the United States Constitution"
                        ),
                    ),
                    None => (
                        format!("U.S. Const. art. {article}"),
                        format!("Article {article} of the United States Constitution"),
                    ),
                })
            }
            AuthorityRule::ConstitutionAmendment => {
                let raw = group("ordinal")?;
                let position = ORDINALS
                    .iter()
                    .position(|ordinal| ordinal.eq_ignore_ascii_case(&raw))
                    .ok_or_else(|| malformed("unknown amendment"))?;
                let number = u32::try_from(position + 1).map_err(|_| malformed("unknown amendment"))?;
                Ok((
                    format!("U.S. Const. amend. {}", to_roman(number)),
                    format!("{} Amendment to the United States Constitution", ORDINALS[position]),
                ))
            }
            AuthorityRule::UsCodeSection | AuthorityRule::UsCode => {
                let title = group("title")?;
                let section = group("section")?;
                Ok((
                    format!("{title} U.S.C. {section}"),
                    format!("Title {title} of the United States Code, Section {section}"),
                ))
            }
            AuthorityRule::PublicLaw => {
                let number = group("number")?;
                Ok((format!("Pub. L. {number}"), format!("Public Law {number}")))
            }
            AuthorityRule::Statute => {
                let section = group("section")?;
                let act = group("act")?;
                let citation = format!("Section {section} of the {act}");
                Ok((citation.clone(), citation))
            }
            AuthorityRule::General => {
                let basis = group("basis")?;
                let basis = basis.trim().to_string();
                let lower = basis.to_lowercase();
                if lower.starts_with("this ") || lower.contains("this order") {
                    return Err(malformed("refers to the document itself"));
                }
                let description = format!("Authority exercised pursuant to {basis}");
                Ok((basis, description))
            }
        }
    }
}

impl Extractor for AuthorityExtractor {
    fn kind(&self) -> KnowledgeType {
        KnowledgeType::Authority
    }

    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let mut cites_code_or_constitution = false;

        for m in self.rules.scan(text) {
            let (citation, description) = match Self::format(&m) {
                Ok(formatted) => formatted,
                Err(err) => {
                    debug!(rule = m.rule, error = %err, "skipping authority match");
                    continue;
                }
            };
            if !seen.insert(normalize_text(&citation)) {
                continue;
            }

            let authority_type = m.tag.authority_type();
            if matches!(authority_type, AuthorityType::UsCode | AuthorityType::Constitution) {
                cites_code_or_constitution = true;
            }
            items.push(KnowledgeItem::new(
                KnowledgeDetails::Authority(AuthorityFact {
                    authority_type,
                    citation,
                    description,
                }),
                context,
                collapse_whitespace(m.text()),
                m.confidence,
            ));
        }

        let confidences: Vec<f32> = items.iter().map(|item| item.confidence).collect();
        let secondary = if cites_code_or_constitution {
            SECONDARY_BONUS
        } else {
            0.0
        };
        let confidence = aggregate_confidence(&confidences, COUNT_BONUS, secondary);
        Ok(Extraction { items, confidence })
    }
}

fn to_roman(mut number: u32) -> String {
    const NUMERALS: [(u32, &str); 8] = [
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut roman = String::new();
    for (value, numeral) in NUMERALS {
        while number >= value {
            roman.push_str(numeral);
            number -= value;
        }
    }
    roman
}
