use anyhow::Context;
use attendance_backend::{
    config::AppConfig, create_router, domain::models::AccountId, initialize_backend,
    io::HmacTokenVerifier,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // `attendance-server issue-token <account_id>` prints a bearer token and exits
    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        if command != "issue-token" {
            anyhow::bail!("Unknown command '{}'; expected 'issue-token <account_id>'", command);
        }
        let raw = args.next().context("issue-token needs an account id")?;
        let account_id = AccountId::parse(&raw)
            .with_context(|| format!("'{}' is not a valid account id", raw))?;
        let verifier = HmacTokenVerifier::new(&config.token_secret)?;
        println!("{}", verifier.issue(&account_id));
        return Ok(());
    }

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Starting server on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
