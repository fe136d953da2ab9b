//! Merges per-source knowledge bundles into one unified record.

use lexfuse_core::{
    AreaTag, ConsensusSummary, FusedItem, KnowledgeBundle, KnowledgeDetails, KnowledgeItem,
    KnowledgeType, SourceAttribution, SourceSummary, UnifiedKnowledgeRecord,
};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, info};

use crate::priority::{FusionConfig, prioritize};

/// Fuses bundles from several sources into a [`UnifiedKnowledgeRecord`].
///
/// Fusion is pure: the same bundles in the same order always produce the same
/// record, and the merged items do not depend on bundle order at all.
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    #[must_use]
    pub const fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Sort bundles by the configured source priority, then fuse them.
    #[must_use]
    pub fn fuse_prioritized(&self, bundles: Vec<KnowledgeBundle>) -> UnifiedKnowledgeRecord {
        let ordered = prioritize(bundles, &self.config.source_priority);
        self.fuse(&ordered)
    }

    /// Fuse bundles given in priority order, most trusted first.
    ///
    /// Priority decides which source's metadata is kept. Each fused item takes
    /// the rendering with the highest confidence (ties go to the smaller
    /// source id) and the union of every source's list fields. Types a bundle
    /// failed to extract contribute nothing; the bundle itself
    /// is still listed in `sources`.
    #[must_use]
    pub fn fuse(&self, bundles: &[KnowledgeBundle]) -> UnifiedKnowledgeRecord {
        let mut record = UnifiedKnowledgeRecord::default();
        let mut merged: BTreeMap<KnowledgeType, BTreeMap<String, FusedItem>> = BTreeMap::new();
        let mut type_scores: BTreeMap<KnowledgeType, Vec<f32>> = BTreeMap::new();

        for bundle in bundles {
            if record.order_number.is_none() {
                record.order_number.clone_from(&bundle.order_number);
            }
            if record.title.is_none() {
                record.title.clone_from(&bundle.title);
            }
            union_tags(&mut record.impact_areas, &bundle.impact_areas);
            union_tags(&mut record.stakeholders, &bundle.stakeholders);
            record.sources.push(SourceSummary {
                source_id: bundle.source_id.clone(),
                source_name: bundle.source_name.clone(),
                extraction_date: bundle.extraction_date,
                failed_types: bundle.failed_types(),
            });

            for (kind, result) in &bundle.by_type {
                if !result.success {
                    debug!(source_id = %bundle.source_id, %kind, "skipping failed type");
                    continue;
                }
                type_scores.entry(*kind).or_default().push(result.confidence);
                let slot = merged.entry(*kind).or_default();
                for item in &result.items {
                    merge_item(slot, item, bundle);
                }
            }
        }

        for (kind, items) in merged {
            *record.items_mut(kind) = items.into_values().collect();
        }

        record.type_confidence = type_scores
            .iter()
            .map(|(kind, scores)| (*kind, mean(scores)))
            .collect();
        let contributed: Vec<f32> = type_scores.into_values().flatten().collect();
        record.overall_confidence = mean(&contributed);
        record.consensus = consensus(&record, bundles.len());

        info!(
            sources = bundles.len(),
            items = record.item_count(),
            corroborated = record.consensus.corroborated_items,
            overall_confidence = record.overall_confidence,
            "fusion finished"
        );
        record
    }
}

fn merge_item(
    slot: &mut BTreeMap<String, FusedItem>,
    item: &KnowledgeItem,
    bundle: &KnowledgeBundle,
) {
    match slot.entry(item.identity_key()) {
        Entry::Vacant(entry) => {
            entry.insert(FusedItem {
                item: item.clone(),
                sources_info: vec![attribution(bundle, item.confidence)],
            });
        }
        Entry::Occupied(mut entry) => {
            let fused = entry.get_mut();
            if outranks(item, &fused.item) {
                let previous = std::mem::replace(&mut fused.item, item.clone());
                union_details(&mut fused.item.details, &previous.details);
            } else {
                union_details(&mut fused.item.details, &item.details);
            }

            // sources_info stays sorted by source id
            match fused
                .sources_info
                .binary_search_by(|info| info.source_id.as_str().cmp(&bundle.source_id))
            {
                Ok(position) => {
                    let info = &mut fused.sources_info[position];
                    info.confidence = info.confidence.max(item.confidence);
                }
                Err(position) => fused
                    .sources_info
                    .insert(position, attribution(bundle, item.confidence)),
            }
        }
    }
}

/// Whether `candidate` should replace `current` as the rendering of a fused
/// item: higher confidence wins, ties go to the smaller source id.
fn outranks(candidate: &KnowledgeItem, current: &KnowledgeItem) -> bool {
    candidate
        .confidence
        .total_cmp(&current.confidence)
        .then_with(|| current.source_id.cmp(&candidate.source_id))
        .is_gt()
}

/// Union the list fields of two renderings of the same fact as sorted sets.
fn union_details(into: &mut KnowledgeDetails, other: &KnowledgeDetails) {
    match (into, other) {
        (KnowledgeDetails::Requirement(into), KnowledgeDetails::Requirement(other)) => {
            union_sorted(&mut into.target_entities, &other.target_entities);
        }
        (KnowledgeDetails::Impact(into), KnowledgeDetails::Impact(other)) => {
            union_sorted(&mut into.affected_entities, &other.affected_entities);
            union_sorted(&mut into.related_requirement_ids, &other.related_requirement_ids);
        }
        (KnowledgeDetails::Entity(into), KnowledgeDetails::Entity(other)) => {
            union_sorted(&mut into.aliases, &other.aliases);
            union_sorted(&mut into.responsibilities, &other.responsibilities);
        }
        (KnowledgeDetails::Definition(into), KnowledgeDetails::Definition(other)) => {
            union_sorted(&mut into.related_terms, &other.related_terms);
        }
        _ => {}
    }
}

fn union_sorted(into: &mut Vec<String>, other: &[String]) {
    into.extend_from_slice(other);
    into.sort();
    into.dedup();
}

fn attribution(bundle: &KnowledgeBundle, confidence: f32) -> SourceAttribution {
    SourceAttribution {
        source_id: bundle.source_id.clone(),
        source_name: bundle.source_name.clone(),
        confidence,
    }
}

/// Append tags whose id is not present yet; the first name seen wins.
fn union_tags(into: &mut Vec<AreaTag>, tags: &[AreaTag]) {
    for tag in tags {
        if !into.iter().any(|existing| existing.id == tag.id) {
            into.push(tag.clone());
        }
    }
}

fn consensus(record: &UnifiedKnowledgeRecord, source_count: usize) -> ConsensusSummary {
    let (unique_items, corroborated_items) = KnowledgeType::ALL
        .iter()
        .flat_map(|kind| record.items(*kind))
        .fold((0, 0), |(unique, corroborated), fused| {
            let shared = usize::from(fused.source_count() >= 2);
            (unique + 1, corroborated + shared)
        });
    let agreement_ratio = if unique_items == 0 {
        0.0
    } else {
        corroborated_items as f32 / unique_items as f32
    };

    ConsensusSummary {
        source_count,
        unique_items,
        corroborated_items,
        agreement_ratio,
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lexfuse_core::{
        DateFact, DateType, EntityFact, EntityType, Extraction, ExtractionContext, Priority,
        RequirementFact, RequirementType, SourceDocument, TypeExtraction,
    };

    fn date_item(source_id: &str, day: u32, confidence: f32) -> KnowledgeItem {
        let details = KnowledgeDetails::Date(DateFact {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap_or_default(),
            date_type: DateType::Deadline,
            is_explicit: true,
        });
        let context = ExtractionContext::new(source_id, source_id.to_uppercase());
        KnowledgeItem::new(details, &context, format!("by March {day}, 2025"), confidence)
    }

    fn entity_item(source_id: &str, name: &str, confidence: f32) -> KnowledgeItem {
        aliased_entity(source_id, name, &[], confidence)
    }

    fn aliased_entity(source_id: &str, name: &str, aliases: &[&str], confidence: f32) -> KnowledgeItem {
        let details = KnowledgeDetails::Entity(EntityFact {
            name: name.to_string(),
            entity_type: EntityType::Department,
            aliases: aliases.iter().map(ToString::to_string).collect(),
            responsibilities: Vec::new(),
        });
        let context = ExtractionContext::new(source_id, source_id.to_uppercase());
        KnowledgeItem::new(details, &context, name, confidence)
    }

    fn requirement_item(source_id: &str, targets: &[&str], confidence: f32) -> KnowledgeItem {
        let details = KnowledgeDetails::Requirement(RequirementFact {
            requirement_type: RequirementType::Reporting,
            description: "The Secretary of Energy shall submit a report to Congress".to_string(),
            target_entities: targets.iter().map(ToString::to_string).collect(),
            priority: Priority::Medium,
            is_conditional: false,
            deadline: Some("by March 1, 2025".to_string()),
        });
        let context = ExtractionContext::new(source_id, source_id.to_uppercase());
        let evidence = format!("{source_id}: The Secretary of Energy shall submit a report");
        KnowledgeItem::new(details, &context, evidence, confidence)
    }

    fn bundle(source_id: &str, results: Vec<(KnowledgeType, TypeExtraction)>) -> KnowledgeBundle {
        let document = SourceDocument::new(source_id, source_id.to_uppercase(), "");
        let mut bundle = KnowledgeBundle::for_document(&document);
        bundle.by_type.extend(results);
        bundle
    }

    fn succeeded(items: Vec<KnowledgeItem>, confidence: f32) -> TypeExtraction {
        TypeExtraction::succeeded(Extraction { items, confidence }, 1)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn no_bundles_yield_empty_record() {
        let record = FusionEngine::default().fuse(&[]);
        assert!(record.is_empty());
        assert!(record.sources.is_empty());
        assert!(record.type_confidence.is_empty());
        assert!(approx(record.overall_confidence, 0.0));
        assert_eq!(record.consensus, ConsensusSummary::default());
    }

    #[test]
    fn same_fact_keeps_max_confidence_and_both_sources() {
        let a = bundle("a", vec![(KnowledgeType::Date, succeeded(vec![date_item("a", 1, 0.6)], 0.6))]);
        let b = bundle("b", vec![(KnowledgeType::Date, succeeded(vec![date_item("b", 1, 0.8)], 0.8))]);

        let record = FusionEngine::default().fuse(&[a, b]);
        assert_eq!(record.dates.len(), 1);

        let fused = &record.dates[0];
        assert!(approx(fused.confidence(), 0.8));
        let sources: Vec<(&str, f32)> = fused
            .sources_info
            .iter()
            .map(|info| (info.source_id.as_str(), info.confidence))
            .collect();
        assert_eq!(sources, vec![("a", 0.6), ("b", 0.8)]);
        assert_eq!(record.consensus.corroborated_items, 1);
        assert!(approx(record.consensus.agreement_ratio, 1.0));
        assert!(approx(record.overall_confidence, 0.7));
    }

    #[test]
    fn merged_items_do_not_depend_on_bundle_order() {
        let a = bundle("a", vec![
            (KnowledgeType::Date, succeeded(vec![date_item("a", 1, 0.8), date_item("a", 2, 0.8)], 0.8)),
            (KnowledgeType::Entity, succeeded(vec![entity_item("a", "Department of Energy", 0.9)], 0.9)),
        ]);
        let b = bundle("b", vec![
            (KnowledgeType::Date, succeeded(vec![date_item("b", 2, 0.6), date_item("b", 3, 0.6)], 0.6)),
            (KnowledgeType::Entity, succeeded(vec![entity_item("b", "the Department of Energy", 0.75)], 0.75)),
        ]);

        let engine = FusionEngine::default();
        let forward = engine.fuse(&[a.clone(), b.clone()]);
        let backward = engine.fuse(&[b, a]);

        let items = |record: &UnifiedKnowledgeRecord| -> Vec<FusedItem> {
            KnowledgeType::ALL
                .iter()
                .flat_map(|kind| record.items(*kind))
                .cloned()
                .collect()
        };
        assert_eq!(items(&forward), items(&backward));
        assert_eq!(forward.entities[0].item.source_id, "a");
        assert_eq!(forward.dates.len(), 3);
        assert_eq!(forward.entities.len(), 1);
        assert_eq!(forward.consensus, backward.consensus);
        assert!(approx(forward.overall_confidence, backward.overall_confidence));
    }

    #[test]
    fn equal_confidence_renderings_pick_smaller_source_and_union_aliases() {
        let a = bundle("a", vec![(
            KnowledgeType::Entity,
            succeeded(vec![aliased_entity("a", "Department of Energy", &["DOE"], 0.8)], 0.8),
        )]);
        let b = bundle("b", vec![(
            KnowledgeType::Entity,
            succeeded(vec![aliased_entity("b", "the Department of Energy", &["Energy Department"], 0.8)], 0.8),
        )]);

        let engine = FusionEngine::default();
        let forward = engine.fuse(&[a.clone(), b.clone()]);
        let backward = engine.fuse(&[b, a]);
        assert_eq!(forward.entities, backward.entities);

        let fused = &forward.entities[0];
        assert_eq!(fused.item.source_id, "a");
        let entity = fused.item.as_entity();
        assert_eq!(entity.map(|fact| fact.name.as_str()), Some("Department of Energy"));
        assert_eq!(
            entity.map(|fact| fact.aliases.clone()),
            Some(vec!["DOE".to_string(), "Energy Department".to_string()])
        );
    }

    #[test]
    fn corroborated_requirement_takes_stronger_rendering() {
        let a = bundle("a", vec![(
            KnowledgeType::Requirement,
            succeeded(vec![requirement_item("a", &["Secretary of Energy"], 0.6)], 0.6),
        )]);
        let b = bundle("b", vec![(
            KnowledgeType::Requirement,
            succeeded(vec![requirement_item("b", &["Congress", "Secretary of Energy"], 0.8)], 0.8),
        )]);

        let record = FusionEngine::default().fuse(&[a, b]);
        assert_eq!(record.requirements.len(), 1);

        let fused = &record.requirements[0];
        assert!(approx(fused.confidence(), 0.8));
        assert_eq!(fused.source_count(), 2);
        assert_eq!(fused.item.source_id, "b");
        assert!(fused.item.text_evidence.starts_with("b:"));
        assert_eq!(
            fused.item.as_requirement().map(|fact| fact.target_entities.clone()),
            Some(vec!["Congress".to_string(), "Secretary of Energy".to_string()])
        );
        assert_eq!(record.consensus.corroborated_items, 1);
    }

    #[test]
    fn failed_type_contributes_nothing_but_source_is_listed() {
        let a = bundle("a", vec![
            (KnowledgeType::Date, TypeExtraction::failed("boom", 2)),
            (KnowledgeType::Entity, succeeded(vec![entity_item("a", "Department of State", 0.9)], 0.9)),
        ]);

        let record = FusionEngine::default().fuse(&[a]);
        assert!(record.dates.is_empty());
        assert_eq!(record.entities.len(), 1);
        assert_eq!(record.sources.len(), 1);
        assert_eq!(record.sources[0].failed_types, vec![KnowledgeType::Date]);
        assert!(!record.type_confidence.contains_key(&KnowledgeType::Date));
        assert!(approx(record.overall_confidence, 0.9));
    }

    #[test]
    fn repeat_from_same_source_raises_its_attribution() {
        let first = bundle("a", vec![(KnowledgeType::Date, succeeded(vec![date_item("a", 1, 0.6)], 0.6))]);
        let second = bundle("a", vec![(KnowledgeType::Date, succeeded(vec![date_item("a", 1, 0.8)], 0.8))]);

        let record = FusionEngine::default().fuse(&[first, second]);
        let fused = &record.dates[0];
        assert_eq!(fused.source_count(), 1);
        assert!(approx(fused.sources_info[0].confidence, 0.8));
        assert_eq!(record.consensus.corroborated_items, 0);
    }

    #[test]
    fn metadata_follows_priority_and_tags_are_unioned() {
        let mut a = bundle("a", Vec::new());
        a.title = Some("Strengthening the Grid".to_string());
        a.impact_areas = vec![AreaTag::new("energy", "Energy")];
        let mut b = bundle("b", Vec::new());
        b.order_number = Some("14100".to_string());
        b.title = Some("Grid Order".to_string());
        b.impact_areas = vec![AreaTag::new("energy", "Energy Policy"), AreaTag::new("security", "Security")];
        b.stakeholders = vec![AreaTag::new("utilities", "Utilities")];

        let record = FusionEngine::default().fuse(&[a, b]);
        assert_eq!(record.order_number.as_deref(), Some("14100"));
        assert_eq!(record.title.as_deref(), Some("Strengthening the Grid"));
        assert_eq!(record.impact_areas, vec![
            AreaTag::new("energy", "Energy"),
            AreaTag::new("security", "Security"),
        ]);
        assert_eq!(record.stakeholders.len(), 1);
    }

    #[test]
    fn prioritized_fusion_uses_configured_order() {
        let mut news = bundle("news", Vec::new());
        news.title = Some("News headline".to_string());
        let mut register = bundle("federal_register", Vec::new());
        register.title = Some("Official title".to_string());

        let engine = FusionEngine::new(FusionConfig {
            source_priority: vec!["federal_register".to_string()],
        });
        let record = engine.fuse_prioritized(vec![news, register]);
        assert_eq!(record.title.as_deref(), Some("Official title"));
        assert_eq!(record.sources[0].source_id, "federal_register");
    }
}
