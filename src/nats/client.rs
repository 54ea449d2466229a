use anyhow::{Context, Result};
use futures::stream::{self, SelectAll};
use serde::Deserialize;
use tracing::info;

/// NATS configuration
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

/// Connected NATS client
pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    /// Connect to NATS
    pub async fn connect(config: &NatsConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let client = async_nats::connect(&config.url)
            .await
            .context("Failed to connect to NATS")?;

        Ok(Self { client })
    }

    /// Subscribe to every subject and merge the deliveries into one stream
    pub async fn subscribe_all(&self, subjects: &[String]) -> Result<SelectAll<async_nats::Subscriber>> {
        let mut subscribers = Vec::with_capacity(subjects.len());

        for subject in subjects {
            let subscriber = self
                .client
                .subscribe(subject.clone())
                .await
                .with_context(|| format!("Failed to subscribe to '{}'", subject))?;
            info!(subject = %subject, "Subscribed to input subject");
            subscribers.push(subscriber);
        }

        Ok(stream::select_all(subscribers))
    }

    /// Get underlying NATS client
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }
}
