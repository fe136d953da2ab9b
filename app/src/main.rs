#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;
mod source;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, ExtractInput, ExtractStrategy, FuseInput, FuseStrategy, InfoStrategy,
    InitStrategy, VersionStrategy,
};
use lexfuse_config::{Config, LoggingConfig};
use lexfuse_core::{AreaTag, KnowledgeType};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexfuse")]
#[command(about = "Knowledge extraction and cross-source fusion for executive orders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a knowledge bundle from one source's plain-text document
    Extract {
        /// Plain-text document to read
        #[arg(short, long)]
        input: PathBuf,

        /// Source identifier, e.g. `federal_register`
        #[arg(long)]
        source_id: String,

        /// Human-readable source name
        #[arg(long)]
        source_name: String,

        /// Signing date (YYYY-MM-DD) used to resolve relative deadlines
        #[arg(short = 'd', long)]
        reference_date: Option<NaiveDate>,

        /// Executive order number
        #[arg(long)]
        order_number: Option<String>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Impact area tag as `id=Name`, repeatable
        #[arg(long = "impact-area", value_parser = parse_area_tag)]
        impact_areas: Vec<AreaTag>,

        /// Stakeholder tag as `id=Name`, repeatable
        #[arg(long = "stakeholder", value_parser = parse_area_tag)]
        stakeholders: Vec<AreaTag>,

        /// Comma-separated knowledge types (default: configured types)
        #[arg(short, long, value_delimiter = ',')]
        types: Vec<KnowledgeType>,

        /// Write the bundle here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fuse bundles from several sources into one unified record
    Fuse {
        /// Bundle JSON files produced by `extract`
        #[arg(required = true)]
        bundles: Vec<PathBuf>,

        /// Write the record here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load();
    let level = config
        .as_ref()
        .map_or_else(|_| LoggingConfig::default().level, |c| c.logging.level.clone());
    init_tracing(&level)?;

    match cli.command {
        Commands::Extract {
            input,
            source_id,
            source_name,
            reference_date,
            order_number,
            title,
            impact_areas,
            stakeholders,
            types,
            output,
        } => {
            ExtractStrategy
                .execute(ExtractInput {
                    config: config?,
                    input,
                    source_id,
                    source_name,
                    reference_date,
                    order_number,
                    title,
                    impact_areas,
                    stakeholders,
                    types,
                    output,
                })
                .await
        }
        Commands::Fuse { bundles, output } => {
            FuseStrategy
                .execute(FuseInput {
                    config: config?,
                    bundles,
                    output,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(config?).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

/// Parse `id=Name`; a bare `id` doubles as its name.
fn parse_area_tag(raw: &str) -> Result<AreaTag, String> {
    let (id, name) = raw.split_once('=').unwrap_or((raw, raw));
    let (id, name) = (id.trim(), name.trim());
    if id.is_empty() || name.is_empty() {
        return Err(format!("expected `id=Name`, got '{raw}'"));
    }
    Ok(AreaTag::new(id, name))
}

/// Log to stderr so JSON on stdout stays clean. `RUST_LOG` wins over the
/// configured level.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn extract_arguments_parse_types_and_date() {
        let cli = Cli::try_parse_from([
            "lexfuse",
            "extract",
            "--input",
            "eo.txt",
            "--source-id",
            "federal_register",
            "--source-name",
            "Federal Register",
            "--reference-date",
            "2025-01-20",
            "--types",
            "dates,requirement",
        ])
        .expect("arguments should parse");

        let Commands::Extract {
            reference_date,
            types,
            output,
            ..
        } = cli.command
        else {
            panic!("expected the extract command");
        };
        assert_eq!(reference_date, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(types, vec![KnowledgeType::Date, KnowledgeType::Requirement]);
        assert!(output.is_none());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn extract_arguments_collect_area_tags() {
        let cli = Cli::try_parse_from([
            "lexfuse",
            "extract",
            "-i",
            "eo.txt",
            "--source-id",
            "white_house",
            "--source-name",
            "White House",
            "--impact-area",
            "energy=Energy Policy",
            "--impact-area",
            "security",
            "--stakeholder",
            "utilities=Electric Utilities",
        ])
        .expect("arguments should parse");

        let Commands::Extract {
            impact_areas,
            stakeholders,
            ..
        } = cli.command
        else {
            panic!("expected the extract command");
        };
        assert_eq!(impact_areas, vec![
            AreaTag::new("energy", "Energy Policy"),
            AreaTag::new("security", "security"),
        ]);
        assert_eq!(stakeholders, vec![AreaTag::new("utilities", "Electric Utilities")]);
        assert!(parse_area_tag("=Energy").is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let parsed = Cli::try_parse_from([
            "lexfuse",
            "extract",
            "-i",
            "eo.txt",
            "--source-id",
            "a",
            "--source-name",
            "A",
            "-t",
            "rumors",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn fuse_requires_bundles() {
        assert!(Cli::try_parse_from(["lexfuse", "fuse"]).is_err());
        assert!(Cli::try_parse_from(["lexfuse", "fuse", "a.json", "b.json"]).is_ok());
    }
}
