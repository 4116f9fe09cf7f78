use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use transit_import::error::ImportError;
use transit_import::pipeline::{ImportConfig, run_import};
use transit_import::store::MemoryStore;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "import failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ImportError> {
    let config = ImportConfig::from_env()?.with_args(std::env::args().skip(1))?;
    info!(
        input = %config.input.display(),
        output = %config.output_dir.display(),
        batch_size = config.batch_size,
        "starting import"
    );

    let store = MemoryStore::open(&config.output_dir)?;
    let summary = run_import(&store, &config).await?;

    for (collection, count) in &summary.inserted {
        info!(collection = %collection, count, "collection written");
    }
    Ok(())
}
