use chrono::{Days, Months, NaiveDate};
use lexfuse_core::{
    DateFact, DateType, Error, Extraction, ExtractionContext, Extractor, KnowledgeDetails,
    KnowledgeItem, KnowledgeType, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::{MONTH, long_date};
use crate::patterns::{BuildError, OverlapPolicy, RuleDef, RuleMatch, RuleSet};
use crate::scoring::{CountBonus, aggregate_confidence};
use crate::text::collapse_whitespace;

const EXPLICIT_CONFIDENCE: f32 = 0.8;
const RELATIVE_CONFIDENCE: f32 = 0.6;

const COUNT_BONUS: CountBonus = CountBonus {
    threshold: 3,
    bonus: 0.05,
};

/// How the date inside a match is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateForm {
    /// `year`, `month` and `day` groups; the month is a name or a number.
    Explicit,
    /// `amount` (digits) and `unit` groups, relative to the reference date.
    Relative,
    /// `amount` (number words) and `unit` groups.
    RelativeWords,
}

/// Tag of a date rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub date_type: DateType,
    pub form: DateForm,
}

impl DateRule {
    const fn new(date_type: DateType, form: DateForm) -> Self {
        Self { date_type, form }
    }
}

const NUMBER_WORD: &str = r"(?:an|a|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety|hundred)";

const UNIT: &str = r"(?P<unit>days?|weeks?|months?|years?)";

/// Extracts deadlines, effective dates, signing dates and other dates.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    rules: RuleSet<DateRule>,
}

impl DateExtractor {
    /// # Errors
    /// Returns an error if a rule fails to compile.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Ok(Self {
            rules: RuleSet::compile(&Self::rule_defs(), OverlapPolicy::FirstRuleWins)?,
        })
    }

    /// The rule table, most specific first.
    #[must_use]
    pub fn rule_defs() -> Vec<RuleDef<DateRule>> {
        use DateForm::{Explicit, Relative, RelativeWords};

        let long = long_date();
        vec![
            RuleDef::new(
                "deadline",
                DateRule::new(DateType::Deadline, Explicit),
                format!(r"(?i:\b(?:by|no\s+later\s+than|not\s+later\s+than|on\s+or\s+before|before))\s+{long}"),
                EXPLICIT_CONFIDENCE,
            ),
            RuleDef::new(
                "effective",
                DateRule::new(DateType::Effective, Explicit),
                format!(r"(?i:\b(?:effective|takes?\s+effect|becomes?\s+effective)(?:\s+(?:on|as\s+of|beginning))?)\s+{long}"),
                EXPLICIT_CONFIDENCE,
            ),
            RuleDef::new(
                "signing",
                DateRule::new(DateType::Signing, Explicit),
                format!(r"(?i:\b(?:signed|dated|issued)(?:\s+(?:on|this))?)\s+{long}"),
                EXPLICIT_CONFIDENCE,
            ),
            RuleDef::new(
                "compound",
                DateRule::new(DateType::Signing, Explicit),
                format!(r"\b(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\s+day\s+of\s+(?P<month>{MONTH}),?\s+(?:in\s+the\s+year\s+)?(?P<year>\d{{4}})\b"),
                EXPLICIT_CONFIDENCE,
            ),
            RuleDef::new(
                "relative",
                DateRule::new(DateType::Deadline, Relative),
                format!(r"(?i)\bwithin\s+(?:[a-z-]+\s+){{0,3}}\(?(?P<amount>\d{{1,4}})\)?\s+{UNIT}\b"),
                RELATIVE_CONFIDENCE,
            ),
            RuleDef::new(
                "relative_after",
                DateRule::new(DateType::Deadline, Relative),
                format!(r"(?i)\b(?P<amount>\d{{1,4}})\s+{UNIT}\s+(?:after|from|following)\s+the\s+date\s+of\s+this\s+(?:order|memorandum|proclamation)\b"),
                RELATIVE_CONFIDENCE,
            ),
            RuleDef::new(
                "relative_words",
                DateRule::new(DateType::Deadline, RelativeWords),
                format!(r"(?i)\bwithin\s+(?P<amount>{NUMBER_WORD}(?:(?:\s+and)?[\s-]+{NUMBER_WORD})*)\s+{UNIT}\b"),
                RELATIVE_CONFIDENCE,
            ),
            RuleDef::new(
                "mentioned",
                DateRule::new(DateType::Mentioned, Explicit),
                long,
                EXPLICIT_CONFIDENCE,
            ),
            RuleDef::new(
                "mentioned_iso",
                DateRule::new(DateType::Mentioned, Explicit),
                r"\b(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})\b",
                EXPLICIT_CONFIDENCE,
            ),
            RuleDef::new(
                "mentioned_numeric",
                DateRule::new(DateType::Mentioned, Explicit),
                r"\b(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})\b",
                EXPLICIT_CONFIDENCE,
            ),
        ]
    }

    fn resolve(m: &RuleMatch<'_, DateRule>, reference: NaiveDate) -> Result<(NaiveDate, bool)> {
        let malformed = |reason: &str| Error::malformed(KnowledgeType::Date, m.text(), reason);

        match m.tag.form {
            DateForm::Explicit => {
                let year = m
                    .group("year")
                    .and_then(|y| y.parse::<i32>().ok())
                    .ok_or_else(|| malformed("missing year"))?;
                let month = m
                    .group("month")
                    .and_then(parse_month)
                    .ok_or_else(|| malformed("unrecognized month"))?;
                let day = m
                    .group("day")
                    .and_then(|d| d.parse::<u32>().ok())
                    .ok_or_else(|| malformed("missing day"))?;
                let date = NaiveDate::from_ymd_opt(year, month, day)
                    .ok_or_else(|| malformed("not a calendar date"))?;
                Ok((date, true))
            }
            DateForm::Relative | DateForm::RelativeWords => {
                let amount = m
                    .group("amount")
                    .and_then(|a| match m.tag.form {
                        DateForm::Relative => a.parse::<u32>().ok(),
                        _ => parse_number_words(a),
                    })
                    .filter(|amount| *amount > 0)
                    .ok_or_else(|| malformed("unreadable amount"))?;
                let unit = m.group("unit").ok_or_else(|| malformed("missing unit"))?;
                let date = add_relative(reference, amount, unit)
                    .ok_or_else(|| malformed("date out of range"))?;
                Ok((date, false))
            }
        }
    }
}

impl Extractor for DateExtractor {
    fn kind(&self) -> KnowledgeType {
        KnowledgeType::Date
    }

    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction> {
        let reference = context.reference_date_or_today();
        let mut seen: HashSet<(DateType, NaiveDate)> = HashSet::new();
        let mut items = Vec::new();

        for m in self.rules.scan(text) {
            let (date, is_explicit) = match Self::resolve(&m, reference) {
                Ok(resolved) => resolved,
                Err(err) => {
                    debug!(rule = m.rule, error = %err, "skipping date match");
                    continue;
                }
            };
            if !seen.insert((m.tag.date_type, date)) {
                continue;
            }

            let fact = DateFact {
                date,
                date_type: m.tag.date_type,
                is_explicit,
            };
            items.push(KnowledgeItem::new(
                KnowledgeDetails::Date(fact),
                context,
                collapse_whitespace(m.text()),
                m.confidence,
            ));
        }

        let confidences: Vec<f32> = items.iter().map(|item| item.confidence).collect();
        let confidence = aggregate_confidence(&confidences, COUNT_BONUS, 0.0);
        Ok(Extraction { items, confidence })
    }
}

/// Month number from a name, an abbreviation or digits.
fn parse_month(raw: &str) -> Option<u32> {
    if let Ok(number) = raw.parse::<u32>() {
        return (1..=12).contains(&number).then_some(number);
    }
    let prefix: String = raw.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn number_word_value(word: &str) -> Option<u32> {
    let value = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value)
}

/// Value of an English number phrase such as "one hundred and twenty".
fn parse_number_words(raw: &str) -> Option<u32> {
    let mut total: u32 = 0;
    for word in raw
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        match word.as_str() {
            "and" => {}
            "hundred" => total = total.max(1).checked_mul(100)?,
            other => total = total.checked_add(number_word_value(other)?)?,
        }
    }
    (total > 0).then_some(total)
}

/// Calendar arithmetic: days and weeks add days, months and years add months.
fn add_relative(reference: NaiveDate, amount: u32, unit: &str) -> Option<NaiveDate> {
    let unit = unit.to_lowercase();
    if unit.starts_with("day") {
        reference.checked_add_days(Days::new(u64::from(amount)))
    } else if unit.starts_with("week") {
        reference.checked_add_days(Days::new(u64::from(amount) * 7))
    } else if unit.starts_with("month") {
        reference.checked_add_months(Months::new(amount))
    } else {
        reference.checked_add_months(Months::new(amount.checked_mul(12)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn extractor() -> DateExtractor {
        DateExtractor::new().expect("date rules should compile")
    }

    fn context() -> ExtractionContext {
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        ExtractionContext::new("test", "Test Source").with_reference_date(reference)
    }

    fn dates(text: &str) -> Vec<(DateType, String, bool)> {
        extractor()
            .extract(text, &context())
            .map(|extraction| {
                extraction
                    .items
                    .iter()
                    .filter_map(KnowledgeItem::as_date)
                    .map(|fact| (fact.date_type, fact.date.to_string(), fact.is_explicit))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn deadline_claims_span_before_mentioned() {
        assert_eq!(
            dates("The plan is due by March 1, 2025."),
            vec![(DateType::Deadline, "2025-03-01".to_string(), true)]
        );
    }

    #[test]
    fn effective_and_signing_forms() {
        let found = dates("This order is effective on January 20, 2025. Signed on Jan. 15, 2025.");
        assert_eq!(
            found,
            vec![
                (DateType::Effective, "2025-01-20".to_string(), true),
                (DateType::Signing, "2025-01-15".to_string(), true),
            ]
        );
    }

    #[test]
    fn compound_day_of_month_is_signing() {
        assert_eq!(
            dates("THE WHITE HOUSE, the 20th day of January, 2025."),
            vec![(DateType::Signing, "2025-01-20".to_string(), true)]
        );
    }

    #[test]
    fn relative_forms_resolve_against_reference() {
        assert_eq!(
            dates("Within ninety (90) days, agencies shall report."),
            vec![(DateType::Deadline, "2024-03-31".to_string(), false)]
        );
        assert_eq!(
            dates("within six months of the date of this order"),
            vec![(DateType::Deadline, "2024-07-01".to_string(), false)]
        );
        assert_eq!(
            dates("within one hundred and twenty days"),
            vec![(DateType::Deadline, "2024-04-30".to_string(), false)]
        );
        assert_eq!(
            dates("2 years after the date of this order"),
            vec![(DateType::Deadline, "2026-01-01".to_string(), false)]
        );
        assert_eq!(
            dates("within 2 weeks"),
            vec![(DateType::Deadline, "2024-01-15".to_string(), false)]
        );
    }

    #[test]
    fn numeric_forms_are_mentioned() {
        assert_eq!(
            dates("Published 2024-05-06 and amended 07/04/2024."),
            vec![
                (DateType::Mentioned, "2024-05-06".to_string(), true),
                (DateType::Mentioned, "2024-07-04".to_string(), true),
            ]
        );
    }

    #[test]
    fn invalid_calendar_dates_are_skipped() {
        assert!(dates("Reports are due by February 30, 2025.").is_empty());
        assert!(dates("on 13/45/2024").is_empty());
    }

    #[test]
    fn duplicates_within_a_run_keep_the_first() {
        let found = dates("by March 1, 2025 and again no later than March 1, 2025");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn number_words() {
        assert_eq!(parse_number_words("ninety"), Some(90));
        assert_eq!(parse_number_words("one hundred and eighty"), Some(180));
        assert_eq!(parse_number_words("twenty-one"), Some(21));
        assert_eq!(parse_number_words("a"), Some(1));
        assert_eq!(parse_number_words("umpteen"), None);
    }

    #[test]
    fn confidence_follows_item_mix() {
        let extraction = extractor()
            .extract("by March 1, 2025 and within 30 days", &context())
            .unwrap_or_else(|_| Extraction::empty());
        assert_eq!(extraction.items.len(), 2);
        assert!((extraction.confidence - 0.7).abs() < 1e-6);
    }
}
