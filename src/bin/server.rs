use anyhow::Context;
use interview_quiz::{configuration::Settings, server::app::run_server, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load().context("Failed to load configuration")?;
    run_server(settings).await
}
