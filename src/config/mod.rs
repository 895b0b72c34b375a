//! Settings management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HoneytrapSettings (validated, immutable)
//!     → CLI overrides applied once in main
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Trap documents are a separate concern, see `crate::traps`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, SettingsError};
pub use schema::HoneytrapSettings;
pub use schema::{AlertConfig, ListenerConfig, ObservabilityConfig, ResponseConfig, TrapSourceConfig};
