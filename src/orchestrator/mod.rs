//! C3: the orchestrator. Binds concurrency, runs the 4-step pipeline per
//! event, reports outcome back to C1 for ack/nack (§4.3).

pub mod circuit_breaker;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;

use crate::decision::decide;
use crate::error::StoreError;
use crate::intake::RawEvent;
use crate::metrics::Metrics;
use crate::model::Source;
use crate::normalize::{normalize_source_a, normalize_source_b, NormalizeError};
use crate::store::StoreGateway;
use crate::strategy::{self, StrategyOutcome};

use circuit_breaker::CircuitBreaker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Skip,
    Retry,
}

struct OrchestratorContext {
    store: Arc<dyn StoreGateway>,
    breaker: CircuitBreaker,
    metrics: Arc<Metrics>,
    our_seller_ids: Vec<String>,
    deadline: Duration,
}

pub struct Orchestrator {
    ctx: Arc<OrchestratorContext>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn StoreGateway>,
        metrics: Arc<Metrics>,
        our_seller_ids: Vec<String>,
        deadline: Duration,
        circuit_breaker_window: Duration,
        circuit_breaker_cooldown: Duration,
        circuit_breaker_failure_ratio: f64,
    ) -> Self {
        Self {
            ctx: Arc::new(OrchestratorContext {
                store,
                breaker: CircuitBreaker::new(
                    circuit_breaker_window,
                    circuit_breaker_cooldown,
                    circuit_breaker_failure_ratio,
                ),
                metrics,
                our_seller_ids,
                deadline,
            }),
        }
    }

    /// Drain events from the shared internal stream with a bounded worker
    /// pool (§5 "Scheduling model"); on shutdown, stop pulling new events and
    /// wait for in-flight workers up to `drain_deadline` (§4.1 supplement).
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<RawEvent>,
        max_in_flight: usize,
        mut shutdown: watch::Receiver<bool>,
        drain_deadline: Duration,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_in_flight));
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    tracing::info!("orchestrator stopping: shutdown requested, draining in-flight work");
                    break;
                }
                maybe_event = rx.recv() => {
                    let Some(event) = maybe_event else {
                        tracing::info!("orchestrator stopping: event stream closed");
                        break;
                    };

                    let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
                    let ctx = self.ctx.clone();
                    in_flight.spawn(async move {
                        let _permit = permit;
                        process_event(event, ctx).await;
                    });
                }
            }
        }

        let _ = tokio::time::timeout(drain_deadline, async {
            while in_flight.join_next().await.is_some() {}
        })
        .await;

        if !in_flight.is_empty() {
            tracing::warn!(
                remaining = in_flight.len(),
                "drain deadline exceeded, abandoning in-flight events"
            );
        }
    }
}

async fn process_event(event: RawEvent, ctx: Arc<OrchestratorContext>) {
    let started = Instant::now();
    match tokio::time::timeout(ctx.deadline, run_pipeline(&event, &ctx, started)).await {
        Ok(Outcome::Ok) | Ok(Outcome::Skip) => event.ack.ack().await,
        Ok(Outcome::Retry) => {
            event.ack.retry();
            ctx.metrics.inc_retried();
        }
        Err(_elapsed) => {
            tracing::warn!("event processing deadline exceeded");
            ctx.metrics.inc_retried();
            match event.source {
                // Queue-sourced: let visibility timeout expire, it redelivers.
                Source::A => event.ack.retry(),
                // Webhook-sourced: already acked with the initial 202, just drop.
                Source::B => {}
            }
        }
    }
}

async fn run_pipeline(event: &RawEvent, ctx: &OrchestratorContext, started: Instant) -> Outcome {
    ctx.metrics.inc_received();

    let offer_change = match event.source {
        Source::A => {
            normalize_source_a(&event.payload, ctx.store.as_ref(), &ctx.our_seller_ids).await
        }
        Source::B => normalize_source_b(&event.payload),
    };

    let offer_change = match offer_change {
        Ok(oc) => oc,
        Err(NormalizeError::Store(e)) if e.is_transient() => return Outcome::Retry,
        Err(err) => {
            tracing::warn!(error = %err, "normalize failed, skipping");
            ctx.metrics.inc_skipped();
            return Outcome::Skip;
        }
    };
    ctx.metrics.inc_normalized();

    if !ctx.breaker.allow_request() {
        return Outcome::Retry;
    }

    let listing = match ctx.store.get_listing(&offer_change.asin, &offer_change.our_seller_id).await {
        Ok(listing) => {
            ctx.breaker.record_success();
            listing
        }
        Err(StoreError::NotFound) => {
            ctx.breaker.record_success();
            tracing::info!(asin = %offer_change.asin, reason = "product_not_found", "skip");
            ctx.metrics.inc_skipped();
            return Outcome::Skip;
        }
        Err(e) if e.is_transient() => {
            ctx.breaker.record_failure();
            return Outcome::Retry;
        }
        Err(e) => {
            ctx.breaker.record_failure();
            tracing::warn!(error = %e, "structural listing decode error, skipping");
            ctx.metrics.inc_skipped();
            return Outcome::Skip;
        }
    };

    let Some(strategy_id) = listing.strategy_id.clone() else {
        ctx.metrics.inc_skipped();
        return Outcome::Skip;
    };

    let strategy = match ctx.store.get_strategy(&strategy_id).await {
        Ok(strategy) => {
            ctx.breaker.record_success();
            strategy
        }
        Err(StoreError::NotFound) => {
            ctx.breaker.record_success();
            tracing::info!(strategy_id, reason = "strategy_missing", "skip");
            ctx.metrics.inc_skipped();
            return Outcome::Skip;
        }
        Err(e) if e.is_transient() => {
            ctx.breaker.record_failure();
            return Outcome::Retry;
        }
        Err(e) => {
            ctx.breaker.record_failure();
            tracing::warn!(error = %e, "structural strategy decode error, skipping");
            ctx.metrics.inc_skipped();
            return Outcome::Skip;
        }
    };

    let decision = decide(&offer_change, &listing, &strategy);
    ctx.metrics.inc_decided();
    if !decision.should_reprice {
        tracing::info!(asin = %offer_change.asin, reason = decision.reason, "skip");
        ctx.metrics.inc_skipped();
        return Outcome::Skip;
    }

    let mut record = match strategy::apply(&offer_change, &listing, &strategy) {
        StrategyOutcome::Skip(reason) => {
            tracing::info!(asin = %offer_change.asin, reason, "strategy skip");
            ctx.metrics.inc_skipped();
            return Outcome::Skip;
        }
        StrategyOutcome::Write(record) => record,
    };
    ctx.metrics.inc_priced();

    if !record.price_changed {
        return Outcome::Ok;
    }

    record.processing_time_ms = started.elapsed().as_millis() as u64;

    match ctx.store.put_calculated_price(&record).await {
        Ok(()) => {
            ctx.breaker.record_success();
            ctx.metrics.inc_written();
            Outcome::Ok
        }
        Err(e) if e.is_transient() => {
            ctx.breaker.record_failure();
            Outcome::Retry
        }
        Err(e) => {
            ctx.breaker.record_failure();
            tracing::warn!(error = %e, "failed to persist calculated price, skipping");
            ctx.metrics.inc_skipped();
            Outcome::Skip
        }
    }
}
