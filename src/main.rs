use ai_llm_service::telemetry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter(telemetry::DEFAULT_FILTER))
        .with(telemetry::layer())
        .init();

    api::start().await?;

    Ok(())
}
