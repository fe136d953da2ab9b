//! The unified, cross-source knowledge record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bundle::AreaTag;
use crate::knowledge::{KnowledgeItem, KnowledgeType};

/// One source's contribution to a fused item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceAttribution {
    pub source_id: String,
    pub source_name: String,
    pub confidence: f32,
}

/// A knowledge item together with every source that reported it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FusedItem {
    pub item: KnowledgeItem,
    pub sources_info: Vec<SourceAttribution>,
}

impl FusedItem {
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.item.confidence
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources_info.len()
    }
}

/// A bundle that took part in fusion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceSummary {
    pub source_id: String,
    pub source_name: String,
    pub extraction_date: DateTime<Utc>,
    #[serde(default)]
    pub failed_types: Vec<KnowledgeType>,
}

/// Agreement between sources over the fused items.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsensusSummary {
    pub source_count: usize,
    pub unique_items: usize,
    /// Items reported by at least two sources.
    pub corroborated_items: usize,
    /// `corroborated_items / unique_items`, 0 when there are no items.
    pub agreement_ratio: f32,
}

/// One record per logical document, rebuilt on every fusion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UnifiedKnowledgeRecord {
    pub order_number: Option<String>,
    pub title: Option<String>,
    pub dates: Vec<FusedItem>,
    pub requirements: Vec<FusedItem>,
    pub impacts: Vec<FusedItem>,
    pub entities: Vec<FusedItem>,
    pub definitions: Vec<FusedItem>,
    pub authorities: Vec<FusedItem>,
    pub impact_areas: Vec<AreaTag>,
    pub stakeholders: Vec<AreaTag>,
    pub sources: Vec<SourceSummary>,
    /// Mean confidence contributed per type.
    pub type_confidence: BTreeMap<KnowledgeType, f32>,
    pub consensus: ConsensusSummary,
    pub overall_confidence: f32,
}

impl UnifiedKnowledgeRecord {
    #[must_use]
    pub fn items(&self, kind: KnowledgeType) -> &[FusedItem] {
        match kind {
            KnowledgeType::Date => &self.dates,
            KnowledgeType::Requirement => &self.requirements,
            KnowledgeType::Impact => &self.impacts,
            KnowledgeType::Entity => &self.entities,
            KnowledgeType::Definition => &self.definitions,
            KnowledgeType::Authority => &self.authorities,
        }
    }

    pub const fn items_mut(&mut self, kind: KnowledgeType) -> &mut Vec<FusedItem> {
        match kind {
            KnowledgeType::Date => &mut self.dates,
            KnowledgeType::Requirement => &mut self.requirements,
            KnowledgeType::Impact => &mut self.impacts,
            KnowledgeType::Entity => &mut self.entities,
            KnowledgeType::Definition => &mut self.definitions,
            KnowledgeType::Authority => &mut self.authorities,
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        KnowledgeType::ALL
            .iter()
            .map(|kind| self.items(*kind).len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}
