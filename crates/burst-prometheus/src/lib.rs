//! Prometheus metrics for burst runs.
//!
//! [`PrometheusMetrics`] implements [`burst_core::Subscribe`]; register it with the
//! `BatchRunner` and read the registry with [`PrometheusMetrics::gather`] or
//! [`PrometheusMetrics::encode_text`] once the run is over.
//!
//! ## Metrics
//! - `burst_invocations_triggered_total` - Counter
//! - `burst_invocations_completed_total` - Counter
//! - `burst_invocations_retried_total` - Counter
//! - `burst_runs_total{outcome}` - Counter (`finished` | `aborted`)
//! - `burst_run_duration_seconds` - Histogram
//!
//! This crate does not serve `/metrics`: the CLI writes the text exposition to a file.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
