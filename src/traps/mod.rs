//! Trap configuration and resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     config.json candidates
//!     → store.rs (first existing candidate, parse, fail fast)
//!     → validation.rs (semantic checks)
//!     → derived.rs (optional topology document → extra traps)
//!     → TrapConfig, frozen behind Arc
//!
//! Per request:
//!     NormalizedRequest + &TrapConfig
//!     → resolver.rs
//!     → Resolution (content-type, body reference, status, note)
//! ```
//!
//! # Design Decisions
//! - Configuration is typed and validated at load time, never at first use
//! - Immutable after startup: readers need no locking
//! - Resolution is pure; metrics and alerting happen in the HTTP layer

pub mod derived;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod validation;

pub use derived::{load_derived, merge_derived, DerivedConfigError};
pub use resolver::{resolve, Resolution};
pub use schema::{ResponseSpec, TokenEntry, TrapConfig, TrapEntry};
pub use store::{load_trap_config, parse_trap_config, ConfigError};
