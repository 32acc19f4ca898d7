//! Process configuration, populated from the environment at startup (§6,
//! teacher: `models.rs::Config`).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_bind_addr: String,
    pub our_seller_ids: Vec<String>,
    pub webhook_shared_secret: Option<String>,
    pub max_in_flight: usize,
    pub webhook_channel_capacity: usize,
    pub event_deadline: Duration,
    pub shutdown_drain_deadline: Duration,
    pub circuit_breaker_window: Duration,
    pub circuit_breaker_cooldown: Duration,
    pub circuit_breaker_failure_ratio: f64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            http_bind_addr: std::env::var("HTTP_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            our_seller_ids: std::env::var("OUR_SELLER_IDS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            webhook_shared_secret: std::env::var("WEBHOOK_SHARED_SECRET").ok(),
            max_in_flight: std::env::var("MAX_IN_FLIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            webhook_channel_capacity: std::env::var("WEBHOOK_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            event_deadline: Duration::from_secs(
                std::env::var("EVENT_DEADLINE_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            shutdown_drain_deadline: Duration::from_secs(
                std::env::var("SHUTDOWN_DRAIN_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            circuit_breaker_window: Duration::from_secs(
                std::env::var("CIRCUIT_BREAKER_WINDOW_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            circuit_breaker_cooldown: Duration::from_secs(
                std::env::var("CIRCUIT_BREAKER_COOLDOWN_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
            circuit_breaker_failure_ratio: std::env::var("CIRCUIT_BREAKER_FAILURE_RATIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.5),
        }
    }
}
