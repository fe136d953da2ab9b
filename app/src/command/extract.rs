use chrono::NaiveDate;
use lexfuse_config::Config;
use lexfuse_core::{AreaTag, DocumentSource, KnowledgeType};
use lexfuse_extraction::ExtractionOrchestrator;
use std::path::PathBuf;
use tracing::{info, warn};

use super::write_json;
use crate::source::FileDocumentSource;

/// Input parameters for the Extract command strategy.
#[derive(Debug, Clone)]
pub struct ExtractInput {
    pub config: Config,
    /// Plain-text rendering of the document
    pub input: PathBuf,
    pub source_id: String,
    pub source_name: String,
    /// Signing date used to resolve relative deadlines
    pub reference_date: Option<NaiveDate>,
    pub order_number: Option<String>,
    pub title: Option<String>,
    /// Tags the source attaches to the document, carried into the bundle
    pub impact_areas: Vec<AreaTag>,
    pub stakeholders: Vec<AreaTag>,
    /// Types to run; empty means the configured set
    pub types: Vec<KnowledgeType>,
    pub output: Option<PathBuf>,
}

/// Strategy for extracting one source's knowledge bundle.
///
/// Reads the document, runs every requested extractor concurrently and writes
/// the bundle as JSON.
#[derive(Debug, Clone, Copy)]
pub struct ExtractStrategy;

impl super::CommandStrategy for ExtractStrategy {
    type Input = ExtractInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let source = FileDocumentSource::new(PathBuf::new(), &input.source_id, &input.source_name)
            .with_reference_date(input.reference_date)
            .with_order_number(input.order_number)
            .with_title(input.title)
            .with_tags(input.impact_areas, input.stakeholders);
        let key = input.input.to_string_lossy();
        let document = source.fetch(&key).await?;

        let orchestrator = ExtractionOrchestrator::new(input.config.extraction)?;
        let bundle = if input.types.is_empty() {
            orchestrator.extract_enabled(&document).await
        } else {
            orchestrator.extract_all(&document, &input.types).await
        };

        for kind in bundle.failed_types() {
            let error = bundle
                .get(kind)
                .and_then(|result| result.error.as_deref())
                .unwrap_or("unknown error");
            warn!("{kind} extraction failed: {error}");
        }
        info!(
            "Extracted {} items from {} ({})",
            bundle.item_count(),
            source.source_id(),
            input.input.display()
        );

        write_json(&bundle, input.output.as_deref()).await
    }
}
