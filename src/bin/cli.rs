#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use octofhir_sdc::*;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "sdc-import")]
#[command(about = "Import FHIR Questionnaires and QuestionnaireResponses into form definitions")]
#[command(version)]
struct Cli {
    /// FHIR version of the input resources (R4, STU3)
    #[arg(long, default_value = "R4", global = true)]
    fhir_version: String,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert a Questionnaire into a form definition
    Convert {
        /// Path to the Questionnaire file
        #[arg(short, long)]
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge a QuestionnaireResponse into the form built from its Questionnaire
    Merge {
        /// Path to the Questionnaire file
        #[arg(short, long)]
        questionnaire: PathBuf,
        /// Path to the QuestionnaireResponse file
        #[arg(short, long)]
        response: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a Questionnaire and load its answer value sets from local files
    Prefetch {
        /// Path to the Questionnaire file
        #[arg(short, long)]
        questionnaire: PathBuf,
        /// Expanded ValueSet files
        #[arg(short, long, num_args = 1..)]
        value_sets: Vec<PathBuf>,
        /// Maximum number of concurrent expansions
        #[arg(long)]
        max_concurrent: Option<usize>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let version = FhirVersion::parse_str(&cli.fhir_version)
        .ok_or_else(|| SdcError::configuration_error(format!("Unknown FHIR version {}", cli.fhir_version)))?;
    let config = SdcConfig::for_version(version);
    config.validate()?;

    match cli.command {
        Commands::Convert { input, output } => {
            convert(config, &input, output.as_deref())?;
        }
        Commands::Merge {
            questionnaire,
            response,
            output,
        } => {
            merge(config, &questionnaire, &response, output.as_deref())?;
        }
        Commands::Prefetch {
            questionnaire,
            value_sets,
            max_concurrent,
            output,
        } => {
            prefetch(config, &questionnaire, &value_sets, max_concurrent, output.as_deref()).await?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn convert(
    config: SdcConfig,
    input: &Path,
    output: Option<&Path>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let converter = QuestionnaireConverter::with_config(config);
    let content = std::fs::read_to_string(input)?;
    let form = converter.convert_json(&content)?;

    write_output(&form, output)
}

#[cfg(feature = "cli")]
fn merge(
    config: SdcConfig,
    questionnaire: &Path,
    response: &Path,
    output: Option<&Path>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let converter = QuestionnaireConverter::with_config(config);
    let mut form = converter.convert_json(&std::fs::read_to_string(questionnaire)?)?;

    let merger = ResponseMerger::new(converter.value_importer().clone());
    let report = merger.merge_json(&mut form, &std::fs::read_to_string(response)?)?;
    if !report.is_complete() {
        eprintln!(
            "⚠️  {} unknown linkIds, {} dropped occurrences",
            report.unmatched_link_ids.len(),
            report.dropped_occurrences
        );
    }

    write_output(&form, output)
}

#[cfg(feature = "cli")]
async fn prefetch(
    config: SdcConfig,
    questionnaire: &Path,
    value_sets: &[PathBuf],
    max_concurrent: Option<usize>,
    output: Option<&Path>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let converter = QuestionnaireConverter::with_config(config.clone());
    let mut form = converter.convert_json(&std::fs::read_to_string(questionnaire)?)?;

    let resolver = InMemoryValueSetResolver::new();
    for path in value_sets {
        let value_set: ValueSet = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if !resolver.add_value_set(value_set) {
            eprintln!("⚠️  {} has neither url nor id, skipped", path.display());
        }
    }

    let mut prefetch_config = config.prefetch_config;
    if let Some(limit) = max_concurrent {
        prefetch_config = prefetch_config.with_max_concurrent_expansions(limit);
    }
    let loader = AnswerSetLoader::with_config(
        Arc::new(resolver),
        Arc::new(AnswerSetCache::new()),
        prefetch_config,
    )?;
    let report = loader
        .load_answer_value_sets(&mut form, &terminology::NoRefresh)
        .await;

    for failure in &report.failures {
        eprintln!("❌ {} ({}): {}", failure.key, failure.link_ids.join(", "), failure.error);
    }
    eprintln!(
        "✅ {} value sets resolved, {} items from cache, {} empty",
        report.resolved, report.from_cache, report.empty
    );

    write_output(&form, output)
}

#[cfg(feature = "cli")]
fn write_output(
    form: &FormDefinition,
    output: Option<&Path>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(form)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("Form definition written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Please compile with --features cli");
    std::process::exit(1);
}
