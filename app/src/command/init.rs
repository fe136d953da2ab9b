use lexfuse_config::Config;

/// Strategy for initializing the configuration.
///
/// Creates the default configuration file at `~/lexfuse/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config_path = Config::create_config()?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("🔧 Configuration options:");
        println!("   - extraction.enabled_types: knowledge types run by 'lexfuse extract'");
        println!("   - extraction.link_impacts: link impacts to related requirements");
        println!("   - fusion.source_priority: source ids, most trusted first");
        println!("   - logging.level: default log filter (RUST_LOG overrides it)");
        println!();
        Ok(())
    }
}
