//! SimPolars - glide polar capture for flight simulators
//!
//! This library turns a stream of simulator telemetry into per-flap-setting
//! glide polars. It derives a total-energy compensated sink rate from each
//! pair of consecutive samples, smooths the results into airspeed buckets,
//! fits a curve through them for display, and can hold the aircraft in
//! steady wings-level flight while data is being captured.
//!
//! # Architecture
//!
//! ```text
//! TelemetrySource ──► SampleBuffer ──► PerformanceEstimator ──► PolarStore ──► CurveFitter ──► Renderer
//!                          │
//!                          ├──────────► AutotrimController ──► ControlSink
//!                          └──────────► AdaptiveScheduler  ──► next tick interval
//! ```
//!
//! The [`session::Session`] owns every component and runs one tick at a time.
//! All I/O (simulator transport, files, drawing) is delegated to collaborator
//! traits so the core stays synchronous and deterministic.

pub mod autotrim;
pub mod config;
pub mod curve;
pub mod error;
pub mod logging;
pub mod performance;
pub mod polar;
pub mod scheduler;
pub mod session;
pub mod telemetry;

pub use error::{Result, SimPolarsError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Conversion factor from metres per second to kilometres per hour.
pub const MS_TO_KPH: f64 = 3.6;
