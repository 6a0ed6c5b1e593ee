use anyhow::Context;
use clap::Parser;
use simbot_core::{BrainResponse, LoggingConfig, SimbotConfig};
use simbot_thoughts::ThoughtExtractor;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "simbot.toml")]
    config: PathBuf,

    /// Brain response JSON file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Fixed seed for reproducible output (overrides SIMBOT_SEED)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pretty-print the thoughts map
    #[arg(long)]
    pretty: bool,

    /// Print only the thought names, one per line
    #[arg(long)]
    names: bool,
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let registry = tracing_subscriber::registry().with(filter);
    // stdout carries the thoughts; logs go to stderr.
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Loads the config under a stderr subscriber so its fallback and env
/// warnings are not lost before the configured one is installed.
fn load_config(path: &Path) -> SimbotConfig {
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, || SimbotConfig::load_or_default(path))
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read brain response: {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read brain response from stdin")?;
            Ok(text)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config);
    init_logging(&config.logging);
    if args.seed.is_some() {
        config.extractor.seed = args.seed;
    }

    let text = read_input(args.input.as_ref())?;
    let response = BrainResponse::from_json(&text).context("Invalid brain response")?;

    let extractor = ThoughtExtractor::with_config(config.extractor.clone());
    let thoughts = extractor
        .extract(&response)
        .context("Thought extraction failed")?;
    info!(
        "Extracted {} thoughts (seed: {:?})",
        thoughts.len(),
        config.extractor.seed
    );

    if args.names {
        for name in thoughts.names() {
            println!("{}", name);
        }
    } else if args.pretty {
        println!("{}", serde_json::to_string_pretty(&thoughts)?);
    } else {
        println!("{}", serde_json::to_string(&thoughts)?);
    }

    Ok(())
}
