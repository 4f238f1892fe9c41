/// Mechaway Studio: workflow graph editor engine
///
/// Main entry point. Loads configuration from the environment, opens the configured
/// workflow and monitors execution results until interrupted.

use mechaway_studio::{config::Config, studio::run_studio};

/// Application entry point
///
/// Environment:
/// - STUDIO_SERVER_URL / STUDIO_STREAM_PATH for the playbook server
/// - STUDIO_REFRESH_TOKEN for authentication
/// - STUDIO_DATABASE_URL to work against a local SQLite store instead
/// - STUDIO_PLAYBOOK / STUDIO_WORKFLOW to open a workflow on startup
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::default();

    run_studio(config).await?;

    Ok(())
}
