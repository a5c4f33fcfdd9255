use rusty_library_lending::{
    adapters::in_memory::MemberRegistry,
    api::{AppState, create_router},
    application::lending::LendingCoordinator,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_lending=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        start_date = %config.start_date,
        policy = ?config.policy,
        "Configuration loaded"
    );

    // Initialize adapters
    let members = Arc::new(MemberRegistry::new());
    let coordinator =
        LendingCoordinator::with_policy(config.start_date, config.policy, members.clone());

    // Create application state
    let app_state = Arc::new(AppState::new(coordinator, members));

    // Create router
    let app = create_router(app_state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;
    Ok(())
}
