//! Power BI page configuration sync entry point.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use powerbi_pages_config::config::ReportInstance;
use powerbi_pages_config::pipeline;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from a .env file when present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let instance = match ReportInstance::from_env() {
        Ok(instance) => instance,
        Err(e) => {
            error!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&instance).await {
        Ok(()) => {
            info!("page configuration sync complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("page configuration sync failed: {e}");
            ExitCode::FAILURE
        }
    }
}
