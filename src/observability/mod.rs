//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (human or JSON format)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! Alerts are not log events of this subsystem; they have their own sink in
//! `crate::alert` and are only mirrored here.

pub mod logging;
pub mod metrics;
