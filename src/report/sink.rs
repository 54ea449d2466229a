use crate::feature::FeatureCollection;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Outbound side of the message-bus adapter
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Publish one batch on the named output channel
    async fn publish(&self, channel: &str, batch: &FeatureCollection) -> Result<()>;
}

/// Sink that keeps every published batch in memory
#[derive(Default)]
pub struct MemorySink {
    published: Mutex<Vec<(String, FeatureCollection)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All batches published so far, in publish order
    pub fn published(&self) -> Vec<(String, FeatureCollection)> {
        self.published.lock().clone()
    }

    /// Batches published on one channel
    pub fn on_channel(&self, channel: &str) -> Vec<FeatureCollection> {
        self.published
            .lock()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, batch)| batch.clone())
            .collect()
    }
}

#[async_trait]
impl BatchSink for MemorySink {
    async fn publish(&self, channel: &str, batch: &FeatureCollection) -> Result<()> {
        self.published
            .lock()
            .push((channel.to_string(), batch.clone()));
        Ok(())
    }
}
