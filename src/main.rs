//! Repricer engine: ingests competitor-offer change events from a polled
//! queue and an HTTP webhook, decides whether and how to reprice, and writes
//! calculated prices to the key-value store for downstream propagation.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repricer_engine::config::Config;
use repricer_engine::intake::queue::{QueueAdapter, QueueConfig};
use repricer_engine::intake::webhook::{handle_webhook, WebhookState};
use repricer_engine::metrics::Metrics;
use repricer_engine::orchestrator::Orchestrator;
use repricer_engine::store::{RedisStoreGateway, StoreConfig, StoreGateway};

#[derive(Clone)]
struct AppState {
    metrics: Arc<Metrics>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::from_env();

    info!("repricer engine starting");

    let store_config = StoreConfig::from_env();
    let store: Arc<dyn StoreGateway> = Arc::new(
        RedisStoreGateway::connect(&store_config)
            .await
            .context("failed to connect to store")?,
    );
    info!(pool_size = store_config.pool_size, "store gateway connected");

    let metrics = Arc::new(Metrics::default());
    let (event_tx, event_rx) = mpsc::channel(config.webhook_channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let orchestrator = Orchestrator::new(
        store.clone(),
        metrics.clone(),
        config.our_seller_ids.clone(),
        config.event_deadline,
        config.circuit_breaker_window,
        config.circuit_breaker_cooldown,
        config.circuit_breaker_failure_ratio,
    );
    let orchestrator_handle = tokio::spawn(orchestrator.run(
        event_rx,
        config.max_in_flight,
        shutdown_rx.clone(),
        config.shutdown_drain_deadline,
    ));

    let queue_handle = match QueueConfig::from_env() {
        Some(queue_config) => {
            let aws_config = aws_config::load_from_env().await;
            let sqs_client = aws_sdk_sqs::Client::new(&aws_config);
            let adapter = QueueAdapter::new(sqs_client, queue_config);
            Some(tokio::spawn(adapter.run(event_tx.clone(), shutdown_rx.clone())))
        }
        None => {
            info!("SOURCE_A_QUEUE_URL unset, queue adapter disabled");
            None
        }
    };

    let app_state = AppState { metrics: metrics.clone() };
    let webhook_state = WebhookState {
        tx: event_tx.clone(),
        shared_secret: config.webhook_shared_secret.clone(),
    };

    let health_routes = Router::new().route("/health", get(health_check));

    let stats_routes = Router::new()
        .route("/stats", get(stats))
        .with_state(app_state);

    let webhook_routes = Router::new()
        .route("/marketplace-b/webhook", post(handle_webhook))
        .with_state(webhook_state);

    let app = health_routes
        .merge(stats_routes)
        .merge(webhook_routes)
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(
            repricer_engine::middleware::request_logging_simple,
        ));

    let listener = TcpListener::bind(&config.http_bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_bind_addr))?;
    info!(addr = %config.http_bind_addr, "http server listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown_signal());
    server.await.context("http server error")?;

    info!("http server stopped, signaling workers to drain");
    let _ = shutdown_tx.send(true);

    let _ = orchestrator_handle.await;
    if let Some(handle) = queue_handle {
        let _ = handle.await;
    }

    info!("repricer engine stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health_check() -> &'static str {
    "ok"
}

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repricer_engine=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
