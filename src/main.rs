use anyhow::Result;
use tracing::info;

use meteosat_skill::{SkillConfig, VERSION, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SkillConfig::from_env()?;
    let _telemetry = telemetry::init(&config.logging)?;

    // reqwest and axum-server share rustls; pin the provider before either builds a config.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    info!(version = VERSION, "Starting Meteosat skill");
    web::run(config).await
}
