use lexfuse_config::Config;
use lexfuse_core::KnowledgeType;
use lexfuse_extraction::{
    AuthorityExtractor, DateExtractor, DefinitionExtractor, EntityExtractor, ExtractionOrchestrator,
    ImpactExtractor, RequirementExtractor,
};

/// Strategy for displaying configuration information.
///
/// Prints the effective configuration and the registered extractors with the
/// size of their rule tables.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Config;

    async fn execute(&self, config: Self::Input) -> anyhow::Result<()> {
        println!("=== lexfuse Configuration ===\n");

        let config_path = Config::config_path()?;
        println!("Config File:");
        println!("  Path: {}", config_path.display());
        println!(
            "  Status: {}",
            if config_path.exists() { "found" } else { "not found (using defaults)" }
        );
        println!();

        println!("Extraction:");
        println!("  Enabled Types: {}", join_types(&config.extraction.enabled_types));
        println!("  Link Impacts: {}", config.extraction.link_impacts);
        println!();

        println!("Fusion:");
        if config.fusion.source_priority.is_empty() {
            println!("  Source Priority: (empty - caller order)");
        } else {
            println!("  Source Priority: {}", config.fusion.source_priority.join(" > "));
        }
        println!();

        println!("Logging:");
        println!("  Level: {}", config.logging.level);
        println!();

        let orchestrator = ExtractionOrchestrator::new(config.extraction)?;
        println!("Extractors:");
        for kind in orchestrator.registered_types() {
            println!("  {kind}: {} rules", rule_count(kind));
        }

        Ok(())
    }
}

fn join_types(types: &[KnowledgeType]) -> String {
    if types.is_empty() {
        return "(none)".to_string();
    }
    types
        .iter()
        .map(KnowledgeType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule_count(kind: KnowledgeType) -> usize {
    match kind {
        KnowledgeType::Date => DateExtractor::rule_defs().len(),
        KnowledgeType::Requirement => RequirementExtractor::rule_defs().len(),
        KnowledgeType::Impact => ImpactExtractor::rule_defs().len(),
        KnowledgeType::Entity => EntityExtractor::rule_defs().len(),
        KnowledgeType::Definition => DefinitionExtractor::rule_defs().len(),
        KnowledgeType::Authority => AuthorityExtractor::rule_defs().len(),
    }
}
