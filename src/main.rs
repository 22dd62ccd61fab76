// src/main.rs - Axum 0.8.4 application entrypoint
use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod aggregation;
mod cache;
mod config;
mod constants;
mod decision;
mod handlers;
mod middleware;
mod models;
mod net;
mod routes;
mod routing;
mod services;
mod state;

use config::AppConfig;
use constants::REQUEST_BODY_LIMIT_BYTES;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = AppConfig::from_env()?;

    let db_pool = crossfin_store::create_pool(&config.database_url).await?;
    crossfin_store::run_migrations(&db_pool).await?;

    let app_state = AppState::new(db_pool, config.clone()).await?;
    services::registry_seed::seed(&app_state.db).await?;
    services::snapshot_writer::spawn(app_state.clone());

    let app = create_application(app_state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("CrossFin gateway starting on {}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn create_application(state: AppState) -> anyhow::Result<Router> {
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api", routes::api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::public_rate_limit,
        ))
        .layer(axum::middleware::from_fn(middleware::security_headers::security_headers))
        .layer(axum::middleware::from_fn(middleware::input_validation::input_validation))
        .layer(axum::middleware::from_fn(middleware::error_handler::handle_error))
        .layer(middleware::cors::create_cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::trace::make_span)
                .on_request(middleware::trace::on_request)
                .on_response(middleware::trace::on_response),
        )
        .with_state(state);

    Ok(app)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down gracefully");
        },
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| constants::DEFAULT_TRACING_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    Ok(())
}
