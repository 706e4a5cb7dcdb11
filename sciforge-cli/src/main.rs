//! # Sciforge CLI
//!
//! Runs the generative agent against a dataset file.
//!
//! Usage:
//!   sciforge <dataset.json>
//!   sciforge --iterations 10 --top-k 5 data/oscillator.json
//!
//! Provider credentials come from the environment:
//!   OPENAI_API_KEY                      plain OpenAI (optionally OPENAI_MODEL)
//!   AZURE_OPENAI_ENDPOINT + AZURE_OPENAI_DEPLOYMENT + AZURE_OPENAI_API_KEY
//!                                       Azure OpenAI deployment

use clap::Parser;
use sciforge_agent::{AgentConfig, Exporter, GenerativeAgent, Loader};
use sciforge_vm::{Error, ErrorKind, OpenAIProvider, ProviderConfig, Result};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sciforge")]
#[command(author, version, about = "LLM-driven symbolic model discovery")]
struct Cli {
    /// Dataset file (JSON with train_x/train_y and optional valid_x/valid_y)
    dataset: PathBuf,

    /// Output directory for the exported artifact
    #[arg(short, long, default_value = "sciforge_out")]
    output: PathBuf,

    /// Number of loop iterations
    #[arg(long, default_value_t = 5)]
    iterations: usize,

    /// Archive capacity (best candidates kept as feedback)
    #[arg(long = "top-k", default_value_t = 3)]
    top_k: usize,

    /// Retries per iteration beyond the initial attempt
    #[arg(long, default_value_t = 3)]
    max_attempts: usize,

    /// Override the provider's default model
    #[arg(long)]
    model: Option<String>,
}

fn provider_from_env(model: Option<String>) -> Result<OpenAIProvider> {
    let azure = (
        std::env::var("AZURE_OPENAI_ENDPOINT"),
        std::env::var("AZURE_OPENAI_DEPLOYMENT"),
        std::env::var("AZURE_OPENAI_API_KEY"),
    );
    let config = match azure {
        (Ok(endpoint), Ok(deployment), Ok(api_key)) => {
            ProviderConfig::azure(endpoint, deployment, api_key)
        }
        _ => match std::env::var("OPENAI_API_KEY") {
            Ok(api_key) => {
                let mut config = ProviderConfig::openai(api_key);
                if let Ok(model) = std::env::var("OPENAI_MODEL") {
                    config = config.with_model(model);
                }
                config
            }
            Err(_) => {
                return Err(Error::new(
                    ErrorKind::ConfigInvalid,
                    "no provider credentials: set OPENAI_API_KEY, or \
                     AZURE_OPENAI_ENDPOINT + AZURE_OPENAI_DEPLOYMENT + AZURE_OPENAI_API_KEY",
                )
                .with_operation("cli::provider_from_env"));
            }
        },
    };
    let config = match model {
        Some(model) => config.with_model(model),
        None => config,
    };
    OpenAIProvider::new(config).map_err(|e| {
        Error::new(ErrorKind::ConfigInvalid, e.to_string())
            .with_operation("cli::provider_from_env")
            .set_source(e)
    })
}

async fn run(cli: Cli) -> Result<()> {
    let provider = provider_from_env(cli.model)?;
    let loader = Loader::new(&cli.dataset);
    let exporter = Exporter::new(&cli.output);
    let config = AgentConfig {
        iterations: cli.iterations,
        top_k: cli.top_k,
        max_attempts: cli.max_attempts,
        ..Default::default()
    };

    let mut agent = GenerativeAgent::with_config(config, provider, loader, exporter);
    agent.set_up()?;
    let artifact = agent.run().await?;

    let best = agent.archive().best()?;
    println!("Best model (loss = {:e}):", best.sort_loss());
    println!("{}", best.source);
    println!();
    for (name, value) in best.model.params() {
        println!("    {} = {}", name, value);
    }
    println!();
    println!("Artifact: {}", artifact.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("sciforge failed: {}", e);
        log::debug!("{:?}", e);
        std::process::exit(1);
    }
}
