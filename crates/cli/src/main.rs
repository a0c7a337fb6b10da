use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::render::{error_json, exit_code_for, models, models_json, table};
use cli::request::RequestDocument;
use detector_core::config;
use detector_core::config::AppConfig;
use detector_core::pipeline;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!("{err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

#[derive(Parser)]
#[command(name = "plagiarism-detector")]
#[command(about = "Semantic similarity and plagiarism detection", long_about = None)]
struct Cli {
    /// Path to config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured embedding providers
    Models {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare a batch of texts and flag potential clones
    Detect {
        /// Request document ({"texts": [{"id", "content"}], "model"?, "threshold"?}); `-` for stdin
        #[arg(short, long)]
        input: PathBuf,
        /// Provider name, overrides the request document
        #[arg(short, long)]
        model: Option<String>,
        /// Similarity threshold in [-1, 1], overrides the request document
        #[arg(short, long, allow_hyphen_values = true)]
        threshold: Option<f32>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = config::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Models { json } => run_models(&cfg, json),
        Commands::Detect {
            input,
            model,
            threshold,
            json,
        } => run_detect(cfg, input, model, threshold, json).await,
    }
}

fn run_models(cfg: &AppConfig, json: bool) -> Result<()> {
    let registry = pipeline::build_registry(cfg);
    if json {
        println!("{}", serde_json::to_string_pretty(&models_json(&registry))?);
    } else {
        print!("{}", models(&registry, &cfg.analysis.default_provider));
    }
    Ok(())
}

async fn run_detect(
    cfg: AppConfig,
    input: PathBuf,
    model: Option<String>,
    threshold: Option<f32>,
    json: bool,
) -> Result<()> {
    let document = RequestDocument::read(&input)?;
    let request = document.into_request(&cfg.analysis, model.as_deref(), threshold);
    info!(
        provider = %request.provider,
        texts = request.items.len(),
        threshold = request.threshold,
        "running analysis"
    );

    let registry = pipeline::build_registry(&cfg);
    match pipeline::analyze(request, &registry).await {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", table(&result));
            }
            Ok(())
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&error_json(&err))?);
            }
            Err(err.into())
        }
    }
}
