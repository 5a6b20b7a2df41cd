use std::env;
use std::sync::Arc;
mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;

use app::build_router;
use auth::jwt::JwtManager;
use auth::services::SessionService;
use config::Config;
use db::repositories::refresh_token_repository::RefreshTokenRepository;
use db::repositories::user_repository::UserRepository;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SWEEP_INTERVAL_SECS: u64 = 3600;

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,session_manager=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    setup_logging();
    tracing::info!("Starting session-manager...");

    let config = Config::from_env()?;
    db::connection::init_pool(&config.database_url);

    let jwt_manager = JwtManager::new(&config.jwt_secret, config.access_token_ttl_minutes);
    let service = Arc::new(SessionService::new(
        Arc::new(RefreshTokenRepository),
        Arc::new(UserRepository),
        jwt_manager.clone(),
        config.refresh_token_ttl_days,
    ));

    let app = build_router(service.clone(), jwt_manager);

    if env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");

        // Periodic maintenance: revoke expired-but-unused tokens so they
        // stop showing as live. Redemption enforces expiry on its own.
        let sweeper = service.clone();
        tokio::spawn(async move {
            let mut tick =
                tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
            loop {
                tick.tick().await;
                match sweeper.sweep_expired() {
                    Ok(0) => {}
                    Ok(revoked) => tracing::info!(revoked, "expired refresh tokens swept"),
                    Err(e) => tracing::warn!("token sweep failed: {e}"),
                }
            }
        });

        let addr = format!("{}:{}", config.server_host, config.server_port);
        let app = app.layer(TraceLayer::new_for_http());
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
