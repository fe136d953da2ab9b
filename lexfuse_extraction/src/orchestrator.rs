//! Runs the registered extractors over one source document.
//!
//! Every enabled extractor gets its own blocking task on the tokio runtime.
//! All tasks are awaited; a failing or panicking extractor only marks its own
//! type as failed in the resulting bundle.

use lexfuse_core::{
    Error, Extraction, Extractor, KnowledgeBundle, KnowledgeType, Result, SourceDocument,
    TypeExtraction,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::extractors::{default_extractors, link_requirements, score_impacts};
use crate::patterns::BuildError;

/// Configuration for the extraction orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Types run by [`ExtractionOrchestrator::extract_enabled`].
    pub enabled_types: Vec<KnowledgeType>,

    /// Whether impacts are linked to requirements after fan-in.
    pub link_impacts: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enabled_types: KnowledgeType::ALL.to_vec(),
            link_impacts: true,
        }
    }
}

/// Fans a document out to one extractor per knowledge type.
pub struct ExtractionOrchestrator {
    extractors: BTreeMap<KnowledgeType, Arc<dyn Extractor>>,
    config: OrchestratorConfig,
}

impl ExtractionOrchestrator {
    /// Create an orchestrator with every built-in extractor registered.
    ///
    /// # Errors
    /// Returns an error if a built-in rule table fails to compile.
    pub fn new(config: OrchestratorConfig) -> std::result::Result<Self, BuildError> {
        let mut orchestrator = Self::empty(config);
        for extractor in default_extractors()? {
            orchestrator.register(extractor);
        }
        Ok(orchestrator)
    }

    /// # Errors
    /// Returns an error if a built-in rule table fails to compile.
    pub fn with_defaults() -> std::result::Result<Self, BuildError> {
        Self::new(OrchestratorConfig::default())
    }

    /// An orchestrator with no extractors registered.
    #[must_use]
    pub const fn empty(config: OrchestratorConfig) -> Self {
        Self {
            extractors: BTreeMap::new(),
            config,
        }
    }

    /// Register an extractor for its type, returning the one it replaces.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) -> Option<Arc<dyn Extractor>> {
        self.extractors.insert(extractor.kind(), extractor)
    }

    #[must_use]
    pub fn registered_types(&self) -> Vec<KnowledgeType> {
        self.extractors.keys().copied().collect()
    }

    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run a single extractor synchronously.
    ///
    /// # Errors
    /// Returns `UnknownExtractor` if nothing is registered for `kind`, or the
    /// extractor's own error.
    pub fn extract(&self, kind: KnowledgeType, document: &SourceDocument) -> Result<Extraction> {
        let extractor = self
            .extractors
            .get(&kind)
            .ok_or(Error::UnknownExtractor(kind))?;
        extractor.extract(&document.text, &document.context())
    }

    /// Run a single extractor named by its type, e.g. `"dates"`.
    ///
    /// # Errors
    /// Returns `UnknownKnowledgeType` for an unrecognized name, otherwise as
    /// [`Self::extract`].
    pub fn extract_named(&self, name: &str, document: &SourceDocument) -> Result<Extraction> {
        let kind: KnowledgeType = name.parse()?;
        self.extract(kind, document)
    }

    /// Run the configured types.
    pub async fn extract_enabled(&self, document: &SourceDocument) -> KnowledgeBundle {
        self.extract_all(document, &self.config.enabled_types).await
    }

    /// Run `enabled` extractors concurrently and collect every result.
    ///
    /// Never fails as a whole: a type whose extractor errors, panics or is
    /// not registered is recorded with `success = false`.
    pub async fn extract_all(
        &self,
        document: &SourceDocument,
        enabled: &[KnowledgeType],
    ) -> KnowledgeBundle {
        let mut bundle = KnowledgeBundle::for_document(document);
        let text: Arc<str> = Arc::from(document.text.as_str());
        let context = Arc::new(document.context());

        let mut kinds = enabled.to_vec();
        kinds.sort();
        kinds.dedup();

        let mut handles = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let Some(extractor) = self.extractors.get(&kind).map(Arc::clone) else {
                let err = Error::UnknownExtractor(kind);
                warn!(%kind, error = %err, "skipping type without extractor");
                bundle
                    .by_type
                    .insert(kind, TypeExtraction::failed(err.to_string(), 0));
                continue;
            };

            let text = Arc::clone(&text);
            let context = Arc::clone(&context);
            let started = Instant::now();
            let handle = tokio::task::spawn_blocking(move || {
                let result = extractor.extract(&text, &context);
                (result, elapsed_ms(started))
            });
            handles.push((kind, started, handle));
        }

        for (kind, started, handle) in handles {
            let result = match handle.await {
                Ok((Ok(extraction), elapsed)) => {
                    debug!(%kind, items = extraction.items.len(), elapsed, "extractor finished");
                    TypeExtraction::succeeded(extraction, elapsed)
                }
                Ok((Err(err), elapsed)) => {
                    warn!(%kind, error = %err, "extractor failed");
                    TypeExtraction::failed(err.to_string(), elapsed)
                }
                Err(join_err) => {
                    let err = Error::ExtractorFailed {
                        kind,
                        message: join_failure_message(join_err),
                    };
                    warn!(%kind, error = %err, "extractor task did not complete");
                    TypeExtraction::failed(err.to_string(), elapsed_ms(started))
                }
            };
            bundle.by_type.insert(kind, result);
        }

        if self.config.link_impacts {
            let linked = link_bundle(&mut bundle);
            debug!(linked, "linked impacts to requirements");
        }

        info!(
            source_id = %bundle.source_id,
            types = bundle.by_type.len(),
            items = bundle.item_count(),
            failed = bundle.failed_types().len(),
            "extraction finished"
        );
        bundle
    }
}

/// Link the bundle's impacts to its requirements and rescore the impacts.
///
/// Does nothing unless both types were extracted successfully. Returns the
/// number of impacts that gained a link.
pub fn link_bundle(bundle: &mut KnowledgeBundle) -> usize {
    let requirements = match bundle.by_type.get(&KnowledgeType::Requirement) {
        Some(result) if result.success => result.items.clone(),
        _ => return 0,
    };
    let Some(impacts) = bundle.by_type.get_mut(&KnowledgeType::Impact) else {
        return 0;
    };
    if !impacts.success {
        return 0;
    }

    let linked = link_requirements(&mut impacts.items, &requirements);
    impacts.confidence = score_impacts(&impacts.items);
    linked
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn join_failure_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|message| format!("panicked: {message}"))
        .or_else(|| {
            payload
                .downcast_ref::<String>()
                .map(|message| format!("panicked: {message}"))
        })
        .unwrap_or_else(|| "panicked".to_string())
}
