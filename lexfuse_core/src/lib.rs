#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod bundle;
pub mod error;
pub mod extractor;
pub mod knowledge;
pub mod record;
pub mod util;

pub use bundle::{AreaTag, ExtractionContext, KnowledgeBundle, SourceDocument, TypeExtraction};
pub use error::{Error, Result};
pub use extractor::{DocumentSource, Extraction, Extractor};
pub use knowledge::{
    AuthorityFact, AuthorityType, DateFact, DateType, DefinitionFact, DefinitionScope, EntityFact,
    EntityType, ImpactFact, ImpactType, KnowledgeDetails, KnowledgeItem, KnowledgeType, Priority,
    RequirementFact, RequirementType, Severity, Timeframe,
};
pub use record::{ConsensusSummary, FusedItem, SourceAttribution, SourceSummary, UnifiedKnowledgeRecord};
pub use util::{content_hash, normalize_text};

/// Confidence reported by an extractor that found nothing.
pub const BASE_CONFIDENCE: f32 = 0.5;

/// Upper bound for any aggregate extractor confidence.
pub const MAX_CONFIDENCE: f32 = 0.95;
