//! Trap configuration document types.
//!
//! The JSON document shape is fixed by existing deployments:
//!
//! ```json
//! {
//!   "traps": {
//!     "/api/v1/users": {
//!       "trap-note": "internal user API",
//!       "trap-response": {"content-type": "application/json", "body": "users.json"},
//!       "uid": {
//!         "token-note": "token handed to vendor X",
//!         "token-response": {"content-type": "text/html", "body": "login.html"}
//!       }
//!     }
//!   },
//!   "default-http-response": {"content-type": "text/html", "body": "404.html"}
//! }
//! ```
//!
//! Inside a trap entry every key other than `trap-note` / `trap-response` is
//! a token name (the literal query-parameter key).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A canned response: content type plus a body reference for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResponseSpec {
    #[serde(rename = "content-type")]
    pub content_type: String,

    /// Template name, JSON document or static file, interpreted by
    /// [`crate::http::response::ResponseRenderer`].
    pub body: String,
}

impl ResponseSpec {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// A honeytoken expected as a query parameter on a trap URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenEntry {
    #[serde(rename = "token-note", default, skip_serializing_if = "Option::is_none")]
    pub token_note: Option<String>,

    #[serde(rename = "token-response", default, skip_serializing_if = "Option::is_none")]
    pub token_response: Option<ResponseSpec>,
}

/// One monitored URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrapEntry {
    #[serde(rename = "trap-note", default, skip_serializing_if = "Option::is_none")]
    pub trap_note: Option<String>,

    /// URI-level fallback when no token carries a response.
    #[serde(rename = "trap-response", default, skip_serializing_if = "Option::is_none")]
    pub trap_response: Option<ResponseSpec>,

    /// Token name → token entry. Every remaining key of the JSON object.
    #[serde(flatten)]
    pub tokens: HashMap<String, TokenEntry>,
}

/// The complete trap configuration. Immutable once the process is serving.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TrapConfig {
    /// Exact URI path → trap entry.
    #[serde(default)]
    pub traps: HashMap<String, TrapEntry>,

    /// Returned (as a 404) when no trap matches.
    #[serde(rename = "default-http-response")]
    pub default_response: ResponseSpec,
}

impl TrapConfig {
    /// A configuration with no traps.
    #[cfg(test)]
    pub fn with_default(default_response: ResponseSpec) -> Self {
        Self {
            traps: HashMap::new(),
            default_response,
        }
    }

    /// Look up a trap by exact path.
    pub fn trap(&self, path: &str) -> Option<&TrapEntry> {
        self.traps.get(path)
    }

    /// Total number of tokens across all traps.
    pub fn token_count(&self) -> usize {
        self.traps.values().map(|t| t.tokens.len()).sum()
    }
}
