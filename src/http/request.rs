//! Request normalization.
//!
//! # Responsibilities
//! - Convert the raw request into a canonical, owned representation
//! - Decode the body (JSON, else UTF-8 text, else opaque bytes)
//! - Parse query arguments (ordered) and urlencoded form fields
//! - Resolve the client IP through X-Forwarded-For
//!
//! # Design Decisions
//! - Pure function of the request: never fails, never reads the clock
//! - The decoded body replaces the raw body for every downstream consumer
//! - Header names are presented in `Title-Case`, the form alert consumers
//!   already key on

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{header, request::Parts, HeaderMap, Method};
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::http::useragent::UserAgent;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The decoded request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Text(String),
    /// Neither JSON nor UTF-8.
    Opaque(Vec<u8>),
}

impl RequestBody {
    /// JSON first, then UTF-8 text, then opaque bytes.
    pub fn decode(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return RequestBody::Empty;
        }
        if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            return RequestBody::Json(value);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => RequestBody::Text(text.to_string()),
            Err(_) => RequestBody::Opaque(bytes.to_vec()),
        }
    }
}

/// Canonical per-request representation shared by resolution and alerting.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRequest {
    pub method: Method,
    /// `http` or `https`.
    pub scheme: String,
    pub host: Option<String>,
    /// Percent-decoded path.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    /// Decoded query arguments in request order, duplicates kept.
    pub args: Vec<(String, String)>,
    /// Urlencoded form fields, first value per key.
    pub form: BTreeMap<String, String>,
    /// Header name (Title-Case) → value, last value per name.
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
    pub client_ip: String,
    pub user_agent: UserAgent,
}

impl NormalizedRequest {
    /// Path plus query, always with the `?` separator.
    pub fn full_path(&self) -> String {
        format!("{}?{}", self.path, self.query)
    }

    /// `<scheme>://<host>/`, if a host is known.
    pub fn url_root(&self) -> Option<String> {
        self.host
            .as_ref()
            .map(|host| format!("{}://{}/", self.scheme, host))
    }

    /// Argument keys in first-occurrence order, each key once.
    pub fn arg_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.args.len());
        for (key, _) in &self.args {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    /// Key → first value.
    pub fn args_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (key, value) in &self.args {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
        map
    }

    /// The first argument rendered as `key=value`.
    pub fn first_arg(&self) -> Option<String> {
        self.args.first().map(|(k, v)| format!("{}={}", k, v))
    }
}

/// Build the normalized request from the request head, its body and the peer.
pub fn normalize(parts: &Parts, body: Bytes, peer: SocketAddr, scheme: &str) -> NormalizedRequest {
    let query = parts.uri.query().unwrap_or_default().to_string();
    let args = parse_pairs(query.as_bytes());

    let (form, body) = if is_urlencoded_form(&parts.headers) {
        let mut form = BTreeMap::new();
        for (key, value) in parse_pairs(&body) {
            form.entry(key).or_insert(value);
        }
        (form, RequestBody::Empty)
    } else {
        (BTreeMap::new(), RequestBody::decode(&body))
    };

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()));

    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .map(|v| UserAgent::parse(&String::from_utf8_lossy(v.as_bytes())))
        .unwrap_or_default();

    NormalizedRequest {
        method: parts.method.clone(),
        scheme: scheme.to_string(),
        host,
        path: decode_path(parts.uri.path()),
        query,
        args,
        form,
        headers: header_map(&parts.headers),
        body,
        client_ip: client_ip(&parts.headers, peer),
        user_agent,
    }
}

/// Percent-decode a request path. Invalid UTF-8 is replaced, not rejected.
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// First address of X-Forwarded-For, else the transport peer.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

fn parse_pairs(input: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn is_urlencoded_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        map.insert(
            title_case(name.as_str()),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    map
}

/// `x-forwarded-for` → `X-Forwarded-For`.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alpha = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
