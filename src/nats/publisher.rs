use crate::feature::FeatureCollection;
use crate::report::BatchSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Publishes feature batches as JSON on NATS subjects
#[derive(Clone)]
pub struct NatsBatchPublisher {
    client: async_nats::Client,
}

impl NatsBatchPublisher {
    /// Create a new batch publisher
    pub fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BatchSink for NatsBatchPublisher {
    /// Subject: the configured output channel
    /// Payload: JSON-serialized FeatureCollection
    async fn publish(&self, channel: &str, batch: &FeatureCollection) -> Result<()> {
        let payload = serde_json::to_vec(batch)
            .context("Failed to serialize feature collection to JSON")?;

        debug!(
            subject = %channel,
            features = batch.len(),
            bytes = payload.len(),
            "Publishing batch to NATS"
        );

        self.client
            .publish(channel.to_string(), payload.into())
            .await
            .with_context(|| format!("Failed to publish batch to subject '{}'", channel))?;

        Ok(())
    }
}
