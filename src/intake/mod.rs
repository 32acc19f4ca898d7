//! C1: intake adapters. Two sub-adapters — a polled queue and an HTTP
//! webhook — feed one shared internal event stream; neither parses business
//! semantics, that's C2's job (§4.1).

pub mod queue;
pub mod webhook;

use crate::model::Source;

/// One raw, unparsed event plus whatever is needed to ack/nack its source.
pub struct RawEvent {
    pub source: Source,
    pub payload: String,
    pub ack: AckHandle,
}

/// How to resolve a `RawEvent` once the orchestrator knows the outcome.
pub enum AckHandle {
    Queue {
        client: aws_sdk_sqs::Client,
        queue_url: String,
        receipt_handle: String,
    },
    Webhook,
}

impl AckHandle {
    /// `ok` or `skip` outcome: delete the queue message; no-op for webhooks
    /// (already acked with the initial 202, §4.1, §7).
    pub async fn ack(&self) {
        if let AckHandle::Queue {
            client,
            queue_url,
            receipt_handle,
        } = self
        {
            if let Err(err) = client
                .delete_message()
                .queue_url(queue_url)
                .receipt_handle(receipt_handle)
                .send()
                .await
            {
                tracing::warn!(error = %err, "failed to delete acked queue message");
            }
        }
    }

    /// `retry` outcome: do nothing. The queue message's visibility timeout
    /// expires and it redelivers naturally; webhook events are already gone
    /// and are simply dropped (§4.3 deadline enforcement).
    pub fn retry(&self) {}
}
