//! # Observability
//!
//! Logging setup and queue telemetry for the notebook engine.
//!
//! - `init_tracing`: installs the `fmt` subscriber with an env filter
//! - `QueueTelemetry`: task, placement and queue depth metrics

pub mod logging;
pub mod telemetry;

pub use logging::init_tracing;
pub use telemetry::{QueueTelemetry, TaskStatus};
