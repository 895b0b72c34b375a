//! HTTP honeytrap library.
//!
//! Every request is answered from a declarative trap table and recorded as a
//! structured alert.

pub mod alert;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod traps;

pub use alert::{AlertRecord, AlertSink, AlertWriter};
pub use config::HoneytrapSettings;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use traps::TrapConfig;
