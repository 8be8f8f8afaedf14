use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stormrisk_common::Config;
use stormrisk_pipeline::{Pipeline, RunStatus};
use stormrisk_risk::RiskScorer;

#[derive(Parser)]
#[command(name = "stormrisk", about = "Florida parcel hurricane-risk ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the embedded SQL migrations
    Migrate,
    /// Run the full pipeline: link, assess, impacts, stats, cleanup
    Run,
    /// Link unlinked properties to parcels
    Link {
        /// Restrict linkage to one county name
        #[arg(long)]
        county: Option<String>,
    },
    /// Run the batch risk assessment only
    Assess,
    /// Detect active-event impacts and create notifications
    Impacts,
    /// Generate county and portfolio risk statistics
    Stats,
    /// Apply retention cleanup policies
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // The trained-model backend ships separately; without it the weighted
    // fallback scores every parcel.
    if let Some(path) = &config.risk_model_path {
        warn!(%path, "RISK_MODEL_PATH set but no model backend is built in; using fallback scoring");
    }
    let scorer = RiskScorer::new();

    let pipeline = Pipeline::from_config(pool.clone(), scorer, &config);

    match cli.command.unwrap_or(Command::Run) {
        Command::Migrate => {
            stormrisk_pipeline::migrate(&pool).await?;
            info!("Migrations applied");
        }
        Command::Run => {
            let report = pipeline.run_full().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.status != RunStatus::Success {
                bail!("pipeline run finished with status {:?}", report.status);
            }
        }
        Command::Link { county } => {
            let linked = pipeline.link_properties(county.as_deref()).await?;
            info!(linked, "Linkage complete");
        }
        Command::Assess => {
            let scored = pipeline.assess_risk().await?;
            info!(scored, "Risk assessment complete");
        }
        Command::Impacts => {
            let created = pipeline.detect_impacts().await?;
            info!(created, "Impact detection complete");
        }
        Command::Stats => {
            let rows = pipeline.generate_statistics().await?;
            info!(rows, "Statistics generated");
        }
        Command::Cleanup => {
            let deleted = pipeline.cleanup().await?;
            info!(deleted, "Cleanup complete");
        }
    }

    Ok(())
}
