//! Long-polled queue adapter (AWS SQS, the real-world vehicle for
//! marketplace-A "AnyOfferChanged" notifications, §4.1, §6).

use tokio::sync::{mpsc, watch};

use crate::model::Source;

use super::{AckHandle, RawEvent};

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub queue_url: String,
    pub batch_size: i32,
    pub wait_time_seconds: i32,
    pub visibility_timeout_seconds: i32,
}

impl QueueConfig {
    pub fn from_env() -> Option<Self> {
        let queue_url = std::env::var("SOURCE_A_QUEUE_URL").ok()?;
        Some(Self {
            queue_url,
            batch_size: std::env::var("QUEUE_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            wait_time_seconds: std::env::var("QUEUE_WAIT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            visibility_timeout_seconds: std::env::var("QUEUE_VISIBILITY_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        })
    }
}

pub struct QueueAdapter {
    client: aws_sdk_sqs::Client,
    config: QueueConfig,
}

impl QueueAdapter {
    pub fn new(client: aws_sdk_sqs::Client, config: QueueConfig) -> Self {
        Self { client, config }
    }

    /// Long-poll loop. Send into `tx` is the adapter's only backpressure
    /// signal: once the bounded channel is full, `send` blocks and the next
    /// `receive_message` call is naturally delayed (§4.3 "queue-adapter
    /// backpressure slows polling").
    pub async fn run(self, tx: mpsc::Sender<RawEvent>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                tracing::info!("queue adapter stopping: shutdown requested");
                return;
            }

            let received = tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("queue adapter stopping mid-poll: shutdown requested");
                    return;
                }
                result = self
                    .client
                    .receive_message()
                    .queue_url(&self.config.queue_url)
                    .max_number_of_messages(self.config.batch_size)
                    .wait_time_seconds(self.config.wait_time_seconds)
                    .visibility_timeout(self.config.visibility_timeout_seconds) => result,
            };

            let messages = match received {
                Ok(output) => output.messages.unwrap_or_default(),
                Err(err) => {
                    tracing::warn!(error = %err, "queue receive failed, backing off");
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    continue;
                }
            };

            for message in messages {
                let (Some(body), Some(receipt_handle)) = (message.body, message.receipt_handle)
                else {
                    continue;
                };

                let event = RawEvent {
                    source: Source::A,
                    payload: body,
                    ack: AckHandle::Queue {
                        client: self.client.clone(),
                        queue_url: self.config.queue_url.clone(),
                        receipt_handle,
                    },
                };

                if tx.send(event).await.is_err() {
                    tracing::info!("queue adapter stopping: event stream closed");
                    return;
                }
            }
        }
    }
}
