//! The six knowledge extractors.
//!
//! Every extractor owns its compiled rule table and is built once through a
//! fallible constructor; after that it is immutable and shared between
//! threads behind an `Arc`.

mod authority;
mod date;
mod definition;
mod entity;
mod impact;
mod requirement;

pub use authority::{AuthorityExtractor, AuthorityRule};
pub use date::{DateExtractor, DateForm, DateRule};
pub use definition::{DefinitionExtractor, DefinitionForm};
pub use entity::EntityExtractor;
pub use impact::{ImpactExtractor, link_requirements, score as score_impacts};
pub use requirement::RequirementExtractor;

use lexfuse_core::{Extractor, KnowledgeType};
use std::sync::Arc;

use crate::patterns::BuildError;

/// Month names and their common abbreviations, without capture groups.
pub(crate) const MONTH: &str = r"(?:Jan(?:uary|\.)?|Feb(?:ruary|\.)?|Mar(?:ch|\.)?|Apr(?:il|\.)?|May|June?|July?|Aug(?:ust|\.)?|Sept?(?:ember|\.)?|Oct(?:ober|\.)?|Nov(?:ember|\.)?|Dec(?:ember|\.)?)";

/// A capitalized official title such as "Secretary of Energy" or
/// "Director of the Office of Management and Budget".
pub(crate) const TITLED_ROLE: &str = r"(?:Attorney[ \t]+General|(?:Secretary|Director|Administrator|Chair(?:man|person)?|Commissioner|Assistant[ \t]+to[ \t]+the[ \t]+President)[ \t]+(?:of|for|on)[ \t]+(?:the[ \t]+)?[A-Z][A-Za-z]*(?:[ \t]+(?:(?:of|for|the|and)[ \t]+)?[A-Z][A-Za-z]*)*)";

/// A capitalized actor directly preceding a modal verb.
pub(crate) const ACTOR: &str =
    r"[A-Z][A-Za-z&'-]*(?:[ \t]+(?:of|the|for|and|on|to|[A-Z][A-Za-z&'-]*))*";

/// Body of a clause: stops at `;`, a line break, or a period that ends a
/// sentence. Periods inside abbreviations ("U.S.C. 1701") do not end it.
pub(crate) const CLAUSE_BODY: &str = r#"(?:[^.;\n]|\.\S|\.[ \t]+[^A-Z\s(";“])*"#;

/// Terminator matching the end of [`CLAUSE_BODY`].
pub(crate) const CLAUSE_END: &str = r"(?:\.|;|\n|$)";

/// `Month D, YYYY` with `month`, `day` and `year` groups.
pub(crate) fn long_date() -> String {
    format!(r"\b(?P<month>{MONTH})[ \t]+(?P<day>\d{{1,2}})(?:st|nd|rd|th)?,?[ \t]+(?P<year>\d{{4}})\b")
}

/// Build the extractor registered for `kind`.
///
/// # Errors
/// Returns an error if the extractor's rule table fails to compile.
pub fn extractor_for(kind: KnowledgeType) -> Result<Arc<dyn Extractor>, BuildError> {
    let extractor: Arc<dyn Extractor> = match kind {
        KnowledgeType::Date => Arc::new(DateExtractor::new()?),
        KnowledgeType::Requirement => Arc::new(RequirementExtractor::new()?),
        KnowledgeType::Impact => Arc::new(ImpactExtractor::new()?),
        KnowledgeType::Entity => Arc::new(EntityExtractor::new()?),
        KnowledgeType::Definition => Arc::new(DefinitionExtractor::new()?),
        KnowledgeType::Authority => Arc::new(AuthorityExtractor::new()?),
    };
    Ok(extractor)
}

/// One extractor per knowledge type, in [`KnowledgeType::ALL`] order.
///
/// # Errors
/// Returns the first rule table that fails to compile.
pub fn default_extractors() -> Result<Vec<Arc<dyn Extractor>>, BuildError> {
    KnowledgeType::ALL.into_iter().map(extractor_for).collect()
}

/// Push `value` unless an equal string is already present.
pub(crate) fn push_unique(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}
