use crate::gateway::Gateway;
use crate::model::InboundRecord;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::NatsClient;

/// Decode one inbound payload
pub fn decode_record(payload: &[u8]) -> Result<InboundRecord> {
    serde_json::from_slice(payload).context("Failed to deserialize inbound record")
}

/// Feed every record delivered on `subjects` into the gateway
///
/// Malformed payloads are logged and skipped. Returns when all
/// subscriptions have closed.
pub async fn run_subscriber(
    gateway: Arc<Gateway>,
    client: &NatsClient,
    subjects: &[String],
) -> Result<()> {
    info!(subjects = ?subjects, "Starting inbound subscriber");

    let mut messages = client.subscribe_all(subjects).await?;

    while let Some(msg) = messages.next().await {
        match decode_record(&msg.payload) {
            Ok(record) => gateway.handle_record(record),
            Err(e) => {
                error!(subject = %msg.subject, error = %e, "Skipping malformed record");
            }
        }
    }

    warn!("Inbound subscriptions ended");
    Ok(())
}
