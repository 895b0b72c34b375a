//! Settings schema definitions.
//!
//! Process-level settings for the responder: where to listen, where the trap
//! documents live, where alerts go. All types derive Serde traits for
//! deserialization from a TOML file; every field has a default so an empty
//! file (or no file at all) yields a runnable configuration.

use serde::{Deserialize, Serialize};

/// Root settings for the honeytrap responder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HoneytrapSettings {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Where the trap configuration documents are looked up.
    pub traps: TrapSourceConfig,

    /// How resolved body references are turned into bytes.
    pub responses: ResponseConfig,

    /// Alert log sink.
    pub alerts: AlertConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:11111").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum concurrently handled requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:11111".to_string(),
            tls: None,
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Candidate locations for the trap documents.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrapSourceConfig {
    /// Primary trap configuration candidates, tried in order.
    pub config_paths: Vec<String>,

    /// Derived (topology) document candidates, tried in order.
    pub derived_paths: Vec<String>,

    /// Communication mechanism that produces derived traps.
    pub derived_comm_option: String,

    /// Paths excluded from resolution and alerting entirely.
    pub reserved_paths: Vec<String>,
}

impl Default for TrapSourceConfig {
    fn default() -> Self {
        Self {
            config_paths: vec!["config.json".to_string(), "/config.json".to_string()],
            derived_paths: vec!["sorrir.json".to_string(), "/sorrir.json".to_string()],
            derived_comm_option: "REST".to_string(),
            reserved_paths: vec!["/favicon.ico".to_string()],
        }
    }
}

/// Response rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Directory holding HTML templates and JSON documents.
    pub templates_dir: String,

    /// Root for static (image) files.
    pub static_root: String,

    /// Body reference rendered with request-derived variables.
    pub custom_template: String,

    /// JSON document served by derived traps.
    pub empty_json_body: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            templates_dir: "templates".to_string(),
            static_root: ".".to_string(),
            custom_template: "custom.html".to_string(),
            empty_json_body: "empty.json".to_string(),
        }
    }
}

/// Alert sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Append-only JSON-lines file. `None` disables the file sink.
    pub log_path: Option<String>,

    /// Mirror every alert to the tracing output.
    pub stdout: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            log_path: Some("logs/honeytrap.log".to_string()),
            stdout: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "honeytrap=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
