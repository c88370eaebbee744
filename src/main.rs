//! Reelstore API server.

use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelstore::adapters::http::{api_router, AppState};
use reelstore::adapters::postgres::{
    create_pool, run_migrations, PostgresCartRepository, PostgresCatalogReader,
    PostgresOrderRepository, PostgresOwnershipLedger, PostgresPaymentRepository,
};
use reelstore::adapters::stripe::StripePaymentGateway;
use reelstore::config::{AppConfig, ServerConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(server: &ServerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| server.log_level.as_str().into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = create_pool(&config.database).await?;
    tracing::info!(database = %config.database.redacted_url(), "Database pool created");
    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let gateway = StripePaymentGateway::new(config.payment.stripe_config())?;
    if config.payment.is_live_mode() {
        tracing::info!("Stripe live mode");
    }

    let state = AppState {
        catalog: Arc::new(PostgresCatalogReader::new(pool.clone())),
        cart: Arc::new(PostgresCartRepository::new(pool.clone())),
        orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        ownership: Arc::new(PostgresOwnershipLedger::new(pool)),
        gateway: Arc::new(gateway),
        checkout: config.checkout.settings(),
    };

    let app = api_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
