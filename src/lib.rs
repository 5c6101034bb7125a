pub mod configuration;
pub mod error;
pub mod inference;
pub mod quiz;
pub mod server;
pub mod telemetry;
