// Inbound record model
pub mod model;

// GeoJSON output model and entity mapping
pub mod feature;

// Unit hierarchy graph
pub mod graph;

// Guarded hierarchy and group detection
pub mod hierarchy;

// Latest-known entity state
pub mod state;

// Per-kind delta buffers
pub mod buffer;

// Pending connection reconciliation
pub mod reconcile;

// Buffer rendering and output sinks
pub mod report;

// Windowed reporting loops
pub mod scheduler;

// Inbound dispatch
pub mod gateway;

// NATS client integration
pub mod nats;

// Configuration
pub mod config;

#[cfg(test)]
mod testing;
