use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use le_completeness::config::RunConfig;
use le_completeness::export::export_report;
use le_completeness::run::run;
use metering_api_client::PublicApiClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "LE interval completeness reporting")]
struct Cli {
    /// Path to the run configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Directory to write the report JSON files into
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RunConfig::load(&cli.config).context("failed to load run configuration")?;
    let client = PublicApiClient::from_env(&config.environment, config.requests_per_sec_max)
        .context("failed to build the API client")?;

    let report = run(&config, &client).await?;

    println!("{}", report.summary);
    if let Some(message) = &report.roster_error {
        eprintln!("roster fetch failed: {message}");
    }

    if let Some(dir) = &cli.out {
        for path in export_report(&report, dir)? {
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}
