use wms_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // 2. Logging
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::info!(version = env!("CARGO_PKG_VERSION"), environment = %config.environment, "WMS server starting...");
    if config.uses_development_secret() {
        tracing::warn!("JWT_SECRET missing or too short, using the development secret");
    }

    // 3. Database (migrations run here) and shared state
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e);
    }

    Ok(())
}
