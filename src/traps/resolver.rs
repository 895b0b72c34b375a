//! Trap resolution: request + configuration → response triple and note.
//!
//! # Algorithm
//! ```text
//! path in traps?
//!     no  → default-http-response, 404
//!     yes → for each query key (first-occurrence order):
//!               key is a token with token-response → candidate (last wins)
//!           candidate?        → token-response, 200
//!           trap-response?    → trap-response, 200
//!           otherwise         → default-http-response, 404
//! ```
//!
//! The note is resolved independently with the same precedence: the last
//! matching token carrying a `token-note`, else `trap-note`, else nothing.
//!
//! Matching is by exact key; argument values are never consulted. The
//! last-match-wins tie-break is observable by clients and is kept as is.

use axum::http::StatusCode;

use crate::http::request::NormalizedRequest;
use crate::traps::schema::{ResponseSpec, TokenEntry, TrapConfig, TrapEntry};

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub content_type: String,
    pub body_ref: String,
    pub status: StatusCode,
    pub note: Option<String>,
    /// The matched trap path, if any.
    pub trap: Option<String>,
    /// The token whose response was chosen, if any.
    pub token: Option<String>,
}

impl Resolution {
    fn from_spec(spec: &ResponseSpec, status: StatusCode) -> Self {
        Self {
            content_type: spec.content_type.clone(),
            body_ref: spec.body.clone(),
            status,
            note: None,
            trap: None,
            token: None,
        }
    }

    /// True when the default response was chosen.
    pub fn is_default(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// Resolve a request against the trap configuration. Pure and deterministic.
pub fn resolve(request: &NormalizedRequest, config: &TrapConfig) -> Resolution {
    let Some(entry) = config.trap(&request.path) else {
        return Resolution::from_spec(&config.default_response, StatusCode::NOT_FOUND);
    };

    let keys = request.arg_keys();
    let token = last_token_with(entry, &keys, |t| t.token_response.is_some());

    let mut resolution = match token.and_then(|name| entry.tokens[name].token_response.as_ref()) {
        Some(spec) => {
            let mut r = Resolution::from_spec(spec, StatusCode::OK);
            r.token = token.map(str::to_string);
            r
        }
        None => match &entry.trap_response {
            Some(spec) => Resolution::from_spec(spec, StatusCode::OK),
            None => Resolution::from_spec(&config.default_response, StatusCode::NOT_FOUND),
        },
    };

    resolution.note = note_for(entry, &keys);
    resolution.trap = Some(request.path.clone());
    resolution
}

/// Token note (last match wins) over trap note.
pub fn note_for(entry: &TrapEntry, keys: &[&str]) -> Option<String> {
    last_token_with(entry, keys, |t| t.token_note.is_some())
        .and_then(|name| entry.tokens[name].token_note.clone())
        .or_else(|| entry.trap_note.clone())
}

fn last_token_with<'a>(
    entry: &TrapEntry,
    keys: &[&'a str],
    accept: impl Fn(&TokenEntry) -> bool,
) -> Option<&'a str> {
    keys.iter()
        .copied()
        .filter(|key| entry.tokens.get(*key).is_some_and(&accept))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::tests::normalized;

    fn config() -> TrapConfig {
        serde_json::from_str(
            r#"{
                "traps": {
                    "/admin": {
                        "trap-note": "admin panel",
                        "trap-response": {"content-type": "text/html", "body": "admin.html"},
                        "a": {"token-note": "token a", "token-response": {"content-type": "text/plain", "body": "a.txt"}},
                        "b": {"token-note": "token b", "token-response": {"content-type": "application/json", "body": "b.json"}},
                        "silent": {"token-response": {"content-type": "text/plain", "body": "silent.txt"}},
                        "noted": {"token-note": "noted only"}
                    },
                    "/bare": {
                        "trap-note": "no response here",
                        "uid": {"token-note": "uid note"}
                    },
                    "/quiet": {
                        "trap-response": {"content-type": "text/html", "body": "quiet.html"}
                    }
                },
                "default-http-response": {"content-type": "text/html", "body": "404.html"}
            }"#,
        )
        .unwrap()
    }

    fn resolve_get(uri: &str) -> Resolution {
        resolve(&normalized("GET", uri, &[], ""), &config())
    }

    #[test]
    fn trap_without_tokens_uses_trap_response() {
        let r = resolve_get("/admin");
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body_ref, "admin.html");
        assert_eq!(r.content_type, "text/html");
        assert_eq!(r.note.as_deref(), Some("admin panel"));
        assert_eq!(r.trap.as_deref(), Some("/admin"));
        assert_eq!(r.token, None);
    }

    #[test]
    fn unknown_path_always_defaults_to_404() {
        for uri in ["/nothing", "/nothing?a=1", "/admin/", "/ADMIN?b=2"] {
            let r = resolve_get(uri);
            assert_eq!(r.status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(r.body_ref, "404.html");
            assert_eq!(r.note, None);
            assert_eq!(r.trap, None);
            assert!(r.is_default());
        }
    }

    #[test]
    fn percent_encoded_path_hits_the_trap() {
        let r = resolve_get("/%61dmin?%62=2");
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.trap.as_deref(), Some("/admin"));
        assert_eq!(r.body_ref, "b.json");
        assert_eq!(r.note.as_deref(), Some("token b"));
    }

    #[test]
    fn token_response_wins_over_trap_response() {
        let r = resolve_get("/admin?a=anything");
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body_ref, "a.txt");
        assert_eq!(r.note.as_deref(), Some("token a"));
        assert_eq!(r.token.as_deref(), Some("a"));
    }

    #[test]
    fn last_matching_token_wins() {
        let r = resolve_get("/admin?a=1&b=2");
        assert_eq!(r.body_ref, "b.json");
        assert_eq!(r.content_type, "application/json");
        assert_eq!(r.note.as_deref(), Some("token b"));

        let r = resolve_get("/admin?b=2&a=1");
        assert_eq!(r.body_ref, "a.txt");
        assert_eq!(r.note.as_deref(), Some("token a"));
    }

    #[test]
    fn duplicate_keys_count_at_first_occurrence() {
        let r = resolve_get("/admin?a=1&b=2&a=3");
        assert_eq!(r.body_ref, "b.json");
    }

    #[test]
    fn value_is_irrelevant_and_unknown_keys_are_ignored() {
        let r = resolve_get("/admin?zzz=1&a=&other=x");
        assert_eq!(r.body_ref, "a.txt");
    }

    #[test]
    fn note_and_response_resolve_independently() {
        // `silent` supplies the response, `a` is the last token with a note.
        let r = resolve_get("/admin?a=1&silent=1");
        assert_eq!(r.body_ref, "silent.txt");
        assert_eq!(r.note.as_deref(), Some("token a"));

        // `noted` has no response: response falls back to `a`, note comes from `noted`.
        let r = resolve_get("/admin?a=1&noted=1");
        assert_eq!(r.body_ref, "a.txt");
        assert_eq!(r.note.as_deref(), Some("noted only"));
    }

    #[test]
    fn trap_without_any_response_defaults_but_keeps_note() {
        let r = resolve_get("/bare?uid=42");
        assert_eq!(r.status, StatusCode::NOT_FOUND);
        assert_eq!(r.body_ref, "404.html");
        assert_eq!(r.note.as_deref(), Some("uid note"));
        assert_eq!(r.trap.as_deref(), Some("/bare"));

        let r = resolve_get("/bare");
        assert_eq!(r.note.as_deref(), Some("no response here"));
    }

    #[test]
    fn trap_without_note_has_no_note() {
        let r = resolve_get("/quiet?x=1");
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.note, None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let config = config();
        let req = normalized("GET", "/admin?a=1&b=2", &[], "");
        assert_eq!(resolve(&req, &config), resolve(&req, &config));
    }

    #[test]
    fn note_for_prefers_token_note() {
        let mut entry = TrapEntry {
            trap_note: Some("trap".into()),
            ..Default::default()
        };
        entry.tokens.insert(
            "t".into(),
            TokenEntry {
                token_note: Some("token".into()),
                token_response: None,
            },
        );
        assert_eq!(note_for(&entry, &["t"]).as_deref(), Some("token"));
        assert_eq!(note_for(&entry, &["other"]).as_deref(), Some("trap"));
    }
}
