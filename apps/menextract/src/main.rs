//! menextract2pdf
//!
//! Burns Mendeley highlights and notes into copies of the annotated PDFs.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menextract::cli::Cli;
use menextract::{AppError, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap so env fallbacks for the arguments apply
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    // Diagnostics go to stderr; stdout carries progress messages only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("menextract v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.database.display());
    tracing::info!("Destination: {}", config.dest.display());

    match menextract::run(&config).await {
        Ok(summary) => {
            tracing::info!(
                "{} files written, {} skipped",
                summary.changed(),
                summary.skipped.len()
            );
            Ok(())
        }
        Err(AppError::DatabaseNotFound(path)) => {
            tracing::error!("Database file not found: {}", path.display());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
