//! Alerting subsystem.
//!
//! # Data Flow
//! ```text
//! NormalizedRequest + Resolution + clock
//!     → record.rs (AlertRecord, fixed schema, "None" placeholders)
//!     → sink.rs AlertSink (unbounded channel, per request task)
//!     → sink.rs AlertWriter (single task)
//!     → JSON line in the alert log + tracing event on `honeytrap::alert`
//! ```
//!
//! # Design Decisions
//! - Exactly one record per alerting request, never mutated after emission
//! - Handlers never wait on disk; the writer task owns all file I/O

pub mod record;
pub mod sink;

pub use record::{build_alert, AlertRecord};
pub use sink::{AlertSink, AlertWriter};
