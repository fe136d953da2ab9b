//! Source documents and per-source knowledge bundles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extractor::Extraction;
use crate::knowledge::{KnowledgeItem, KnowledgeType};

/// An identified label attached to a document by its source, such as an
/// impact area or a stakeholder group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AreaTag {
    pub id: String,
    pub name: String,
}

impl AreaTag {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One source's plain-text rendering of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub text: String,
    /// Signing date used to resolve relative dates.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    pub source_id: String,
    pub source_name: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub impact_areas: Vec<AreaTag>,
    #[serde(default)]
    pub stakeholders: Vec<AreaTag>,
}

impl SourceDocument {
    #[must_use]
    pub fn new(
        source_id: impl Into<String>,
        source_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            reference_date: None,
            source_id: source_id.into(),
            source_name: source_name.into(),
            order_number: None,
            title: None,
            impact_areas: Vec::new(),
            stakeholders: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = Some(order_number.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_impact_areas(mut self, areas: Vec<AreaTag>) -> Self {
        self.impact_areas = areas;
        self
    }

    #[must_use]
    pub fn with_stakeholders(mut self, stakeholders: Vec<AreaTag>) -> Self {
        self.stakeholders = stakeholders;
        self
    }

    /// The extraction context every extractor receives for this document.
    #[must_use]
    pub fn context(&self) -> ExtractionContext {
        ExtractionContext {
            reference_date: self.reference_date,
            source_id: self.source_id.clone(),
            source_name: self.source_name.clone(),
        }
    }
}

/// Per-call context handed to an extractor alongside the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionContext {
    pub reference_date: Option<NaiveDate>,
    pub source_id: String,
    pub source_name: String,
}

impl ExtractionContext {
    #[must_use]
    pub fn new(source_id: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            reference_date: None,
            source_id: source_id.into(),
            source_name: source_name.into(),
        }
    }

    #[must_use]
    pub const fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Reference date, falling back to today's date.
    #[must_use]
    pub fn reference_date_or_today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Result of one extractor for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeExtraction {
    #[serde(default)]
    pub items: Vec<KnowledgeItem>,
    pub confidence: f32,
    pub processing_time_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TypeExtraction {
    #[must_use]
    pub fn succeeded(extraction: Extraction, processing_time_ms: u64) -> Self {
        Self {
            items: extraction.items,
            confidence: extraction.confidence,
            processing_time_ms,
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            items: Vec::new(),
            confidence: 0.0,
            processing_time_ms,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// All knowledge extracted from one source's rendering of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBundle {
    pub source_id: String,
    pub source_name: String,
    pub extraction_date: DateTime<Utc>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub impact_areas: Vec<AreaTag>,
    #[serde(default)]
    pub stakeholders: Vec<AreaTag>,
    #[serde(default)]
    pub by_type: BTreeMap<KnowledgeType, TypeExtraction>,
}

impl KnowledgeBundle {
    /// Start an empty bundle carrying the document's metadata.
    #[must_use]
    pub fn for_document(document: &SourceDocument) -> Self {
        Self {
            source_id: document.source_id.clone(),
            source_name: document.source_name.clone(),
            extraction_date: Utc::now(),
            order_number: document.order_number.clone(),
            title: document.title.clone(),
            impact_areas: document.impact_areas.clone(),
            stakeholders: document.stakeholders.clone(),
            by_type: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, kind: KnowledgeType) -> Option<&TypeExtraction> {
        self.by_type.get(&kind)
    }

    /// Items of a type that was extracted successfully, otherwise empty.
    #[must_use]
    pub fn items(&self, kind: KnowledgeType) -> &[KnowledgeItem] {
        match self.by_type.get(&kind) {
            Some(result) if result.success => &result.items,
            _ => &[],
        }
    }

    #[must_use]
    pub fn failed_types(&self) -> Vec<KnowledgeType> {
        self.by_type
            .iter()
            .filter(|(_, result)| !result.success)
            .map(|(kind, _)| *kind)
            .collect()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.by_type
            .values()
            .filter(|result| result.success)
            .map(|result| result.items.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_types_contribute_no_items() {
        let document = SourceDocument::new("fr", "Federal Register", "text");
        let mut bundle = KnowledgeBundle::for_document(&document);
        bundle.by_type.insert(
            KnowledgeType::Date,
            TypeExtraction::failed("pattern exploded", 3),
        );
        bundle.by_type.insert(
            KnowledgeType::Entity,
            TypeExtraction::succeeded(Extraction::empty(), 1),
        );

        assert!(bundle.items(KnowledgeType::Date).is_empty());
        assert_eq!(bundle.failed_types(), vec![KnowledgeType::Date]);
        assert_eq!(bundle.item_count(), 0);
    }

    #[test]
    fn context_carries_document_attribution() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let document =
            SourceDocument::new("wh", "White House", "text").with_reference_date(date);
        let context = document.context();
        assert_eq!(context.source_id, "wh");
        assert_eq!(context.source_name, "White House");
        assert_eq!(context.reference_date_or_today(), date);
    }
}
