//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (normalize method, args, form, headers, body, client IP)
//!     → useragent.rs (browser / version / language / platform)
//!     → [traps::resolve picks note and response]
//!     → [alert::build_alert → AlertSink]
//!     → response.rs (render template, JSON or static file)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod useragent;

pub use request::{normalize, NormalizedRequest, RequestBody};
pub use response::{RenderError, ResponseRenderer};
pub use server::HttpServer;
pub use useragent::UserAgent;
