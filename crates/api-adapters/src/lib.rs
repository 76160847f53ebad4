//! # api-adapters
//!
//! The HTTP surface for chirp. The axum router lives behind the `web-axum`
//! feature; the metrics registry is always available so other front ends can
//! share it.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod http;

pub use metrics::Metrics;
