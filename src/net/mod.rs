//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Plain:  listener.rs (bind TcpListener) → axum::serve
//! TLS:    tls.rs (load PEM cert/key)     → axum_server::bind_rustls
//! ```
//!
//! Concurrency is bounded in the HTTP layer, not at accept time.

pub mod listener;
pub mod tls;

pub use listener::{bind, ListenerError};
pub use tls::{load_tls_config, TlsError};
