use anyhow::Result;
use gateway::config::{self, GatewayConfig};
use gateway::gateway::Gateway;
use gateway::nats::{run_subscriber, NatsBatchPublisher, NatsClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geojson_gateway=info,gateway=info".into()),
        )
        .init();

    info!("GeoJSON gateway starting...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/gateway.toml"));

    let mut config: GatewayConfig = config::load_or_default(&config_path)?;
    config.apply_env();

    info!(
        path = %config_path.display(),
        nats_url = %config.nats.url,
        frequency_ms = config.output.frequency_ms,
        "Configuration loaded"
    );

    let nats = NatsClient::connect(&config.nats).await?;
    let sink = Arc::new(NatsBatchPublisher::new(nats.client().clone()));

    let gateway = Arc::new(Gateway::new(config.output.clone()));
    let scheduler = gateway.start(sink, &config.topics);

    let inputs = config.topics.inputs();
    tokio::select! {
        result = run_subscriber(gateway.clone(), &nats, &inputs) => {
            if let Err(e) = result {
                error!(error = %e, "Inbound subscriber failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    scheduler.shutdown();
    info!("GeoJSON gateway stopped");

    Ok(())
}
