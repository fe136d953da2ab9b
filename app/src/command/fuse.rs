use anyhow::Context;
use lexfuse_config::Config;
use lexfuse_core::KnowledgeBundle;
use lexfuse_fusion::FusionEngine;
use std::path::PathBuf;
use tracing::info;

use super::write_json;

/// Input parameters for the Fuse command strategy.
#[derive(Debug, Clone)]
pub struct FuseInput {
    pub config: Config,
    /// Bundle JSON files produced by `extract`
    pub bundles: Vec<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Strategy for fusing per-source bundles into one unified record.
///
/// Bundles are ordered by `fusion.source_priority` before merging.
#[derive(Debug, Clone, Copy)]
pub struct FuseStrategy;

impl super::CommandStrategy for FuseStrategy {
    type Input = FuseInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut bundles = Vec::with_capacity(input.bundles.len());
        for path in &input.bundles {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read bundle {}", path.display()))?;
            let bundle: KnowledgeBundle = serde_json::from_str(&content)
                .with_context(|| format!("Invalid bundle {}", path.display()))?;
            bundles.push(bundle);
        }
        info!("Loaded {} bundles", bundles.len());

        let engine = FusionEngine::new(input.config.fusion);
        let record = engine.fuse_prioritized(bundles);

        write_json(&record, input.output.as_deref()).await
    }
}
