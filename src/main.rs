//! Temporal-Store: Main entry point

use anyhow::Context;
use clap::Parser;
use temporal_store::cli::{Cli, Commands, OutputFormat};
use temporal_store::config::StoreConfig;
use temporal_store::db::TemporalStore;
use temporal_store::query::{execute, parse_line, parse_script, run_script, CommandOutput};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => StoreConfig::default(),
    }
    .with_env()
    .context("applying TEMPORAL_STORE_* environment")?;

    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if cli.json_logs {
        config.log.json = true;
    }
    Ok(config)
}

fn init_tracing(config: &StoreConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn render(output: &CommandOutput, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => output.to_string(),
        OutputFormat::Json => output.to_json()?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config);

    let store = TemporalStore::with_config(&config)?;

    match cli.command {
        Commands::Run { script, format } => {
            let text = tokio::fs::read_to_string(&script)
                .await
                .with_context(|| format!("reading {}", script.display()))?;
            for output in run_script(&store, &text)? {
                println!("{}", render(&output, format)?);
            }
        }
        Commands::Repl { format } => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut line_no = 0;
            while let Some(line) = lines.next_line().await? {
                line_no += 1;
                match parse_line(line_no, &line) {
                    Ok(Some(command)) => println!("{}", render(&execute(&store, &command), format)?),
                    Ok(None) => {}
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            tracing::info!(lines = line_no, stats = ?store.stats(), "stdin closed");
        }
        Commands::Check { script } => {
            let text = tokio::fs::read_to_string(&script)
                .await
                .with_context(|| format!("reading {}", script.display()))?;
            let commands = parse_script(&text)?;
            println!("{}: {} commands ok", script.display(), commands.len());
        }
    }

    Ok(())
}
