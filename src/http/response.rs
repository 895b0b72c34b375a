//! Response rendering.
//!
//! # Responsibilities
//! - Turn a resolved (content-type, body reference, status) into bytes
//! - Render the custom template with request-derived variables
//! - Re-serialize JSON documents, send images as raw bytes
//!
//! # Body reference kinds
//! ```text
//! body == custom template name → templates_dir/<body>, {{ browser }} / {{ ua }} substituted
//! content-type application/json → templates_dir/<body>, parsed and re-serialized
//! content-type contains "image"  → static_root/<body>, raw bytes
//! anything else                  → templates_dir/<body>, served verbatim
//! ```
//!
//! # Design Decisions
//! - File reads go through tokio::fs so handlers never block a worker
//! - Failures surface as `RenderError`; the handler maps them to 500

use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::config::ResponseConfig;
use crate::http::useragent::UserAgent;
use crate::traps::Resolution;

/// Error type for response rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid content type '{0}'")]
    ContentType(String),
}

/// How a body reference is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    CustomTemplate,
    Json,
    Image,
    Static,
}

/// Renders resolved responses from the template and static directories.
#[derive(Debug, Clone)]
pub struct ResponseRenderer {
    templates_dir: PathBuf,
    static_root: PathBuf,
    custom_template: String,
}

impl ResponseRenderer {
    pub fn new(templates_dir: impl Into<PathBuf>, static_root: impl Into<PathBuf>, custom_template: impl Into<String>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            static_root: static_root.into(),
            custom_template: custom_template.into(),
        }
    }

    pub fn from_config(config: &ResponseConfig) -> Self {
        Self::new(&config.templates_dir, &config.static_root, config.custom_template.clone())
    }

    pub fn classify(&self, content_type: &str, body_ref: &str) -> BodyKind {
        if body_ref == self.custom_template {
            BodyKind::CustomTemplate
        } else if content_type == "application/json" {
            BodyKind::Json
        } else if content_type.contains("image") {
            BodyKind::Image
        } else {
            BodyKind::Static
        }
    }

    /// Produce the HTTP response for a resolution.
    pub async fn render(&self, resolution: &Resolution, user_agent: &UserAgent) -> Result<Response, RenderError> {
        let content_type = HeaderValue::from_str(&resolution.content_type)
            .map_err(|_| RenderError::ContentType(resolution.content_type.clone()))?;

        let body = match self.classify(&resolution.content_type, &resolution.body_ref) {
            BodyKind::CustomTemplate => {
                let path = self.templates_dir.join(&resolution.body_ref);
                let template = read_to_string(&path).await?;
                let browser = user_agent.browser.as_deref().unwrap_or("None");
                Body::from(render_template(&template, &[("browser", browser), ("ua", &user_agent.string)]))
            }
            BodyKind::Json => {
                let path = self.templates_dir.join(&resolution.body_ref);
                let content = read_to_string(&path).await?;
                let document: serde_json::Value = serde_json::from_str(&content)
                    .map_err(|source| RenderError::Json { path: path.clone(), source })?;
                let bytes = serde_json::to_vec(&document).map_err(|source| RenderError::Json { path, source })?;
                Body::from(bytes)
            }
            BodyKind::Image => {
                let path = self.static_root.join(&resolution.body_ref);
                Body::from(read(&path).await?)
            }
            BodyKind::Static => {
                let path = self.templates_dir.join(&resolution.body_ref);
                Body::from(read(&path).await?)
            }
        };

        Ok((resolution.status, [(header::CONTENT_TYPE, content_type)], body).into_response())
    }
}

/// Empty 200 for reserved asset paths.
pub fn empty_ok() -> Response {
    (StatusCode::OK, "").into_response()
}

async fn read(path: &Path) -> Result<Vec<u8>, RenderError> {
    tokio::fs::read(path).await.map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn read_to_string(path: &Path) -> Result<String, RenderError> {
    tokio::fs::read_to_string(path).await.map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Substitute `{{ name }}` placeholders. Values are HTML-escaped; unknown
/// names render as nothing.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}").map(|i| open + 2 + i) else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = rest[open + 2..close].trim();
        if let Some((_, value)) = vars.iter().find(|(k, _)| *k == name) {
            out.push_str(&escape_html(value));
        }
        rest = &rest[close + 2..];
    }
    out.push_str(rest);
    out
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
