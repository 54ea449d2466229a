// Message-bus adapter: NATS inbound records and outbound batches

mod client;
mod publisher;
mod subscriber;

pub use client::{NatsClient, NatsConfig};
pub use publisher::NatsBatchPublisher;
pub use subscriber::{decode_record, run_subscriber};
