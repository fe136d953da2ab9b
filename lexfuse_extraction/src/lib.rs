#![warn(
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
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

pub mod extractors;
pub mod keywords;
mod orchestrator;
pub mod patterns;
pub mod scoring;
pub mod text;

pub use extractors::{
    AuthorityExtractor, DateExtractor, DefinitionExtractor, EntityExtractor, ImpactExtractor,
    RequirementExtractor, default_extractors, extractor_for,
};
pub use orchestrator::{ExtractionOrchestrator, OrchestratorConfig, link_bundle};
pub use patterns::{BuildError, OverlapPolicy, RuleDef, RuleSet};
