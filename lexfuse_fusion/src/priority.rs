use lexfuse_core::KnowledgeBundle;
use serde::{Deserialize, Serialize};

/// Configuration for cross-source fusion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FusionConfig {
    /// Source ids, most trusted first.
    #[serde(default)]
    pub source_priority: Vec<String>,
}

/// Order bundles by `priority`, most trusted first.
///
/// The sort is stable: sources missing from `priority` keep their given
/// order and come after every listed source.
#[must_use]
pub fn prioritize(mut bundles: Vec<KnowledgeBundle>, priority: &[String]) -> Vec<KnowledgeBundle> {
    bundles.sort_by_key(|bundle| rank(&bundle.source_id, priority));
    bundles
}

fn rank(source_id: &str, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|id| id == source_id)
        .unwrap_or(usize::MAX)
}
