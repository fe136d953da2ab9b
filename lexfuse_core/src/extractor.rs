//! Extractor contract and the document-source collaborator interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::BASE_CONFIDENCE;
use crate::bundle::{ExtractionContext, SourceDocument};
use crate::error::Result;
use crate::knowledge::{KnowledgeItem, KnowledgeType};

/// Items found by one extractor plus its aggregate confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub items: Vec<KnowledgeItem>,
    pub confidence: f32,
}

impl Extraction {
    /// Nothing found: no items at base confidence.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            confidence: BASE_CONFIDENCE,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A pure function from text to knowledge items of one type.
///
/// Implementations hold no mutable state, so one instance can serve
/// concurrent calls from any thread.
pub trait Extractor: Send + Sync {
    /// The knowledge type this extractor produces.
    fn kind(&self) -> KnowledgeType;

    /// Extract items from `text`.
    ///
    /// Malformed matches are skipped; an `Err` means the extractor as a whole
    /// could not run.
    fn extract(&self, text: &str, context: &ExtractionContext) -> Result<Extraction>;
}

/// Supplies plain-text source documents, e.g. a scraper or a file reader.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Identifier stamped on every document this source produces.
    fn source_id(&self) -> &str;

    /// Fetch the plain-text rendering of the document identified by `key`.
    async fn fetch(&self, key: &str) -> anyhow::Result<SourceDocument>;
}
