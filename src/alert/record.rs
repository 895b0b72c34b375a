//! Alert record construction.
//!
//! One record per handled request. The key set is fixed: a value that would
//! be empty or absent is written as the string `"None"` so every record has
//! the same schema.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::request::{NormalizedRequest, RequestBody};
use crate::traps::Resolution;

/// Placeholder for empty or absent values.
pub const NONE: &str = "None";

/// The audit log entry for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub token_note: String,
    pub host: String,
    pub path: String,
    pub http_method: String,
    /// First query argument only, as `key=value`.
    pub token: String,
    pub body: Value,
    pub sourceip: String,
    #[serde(rename = "user-agent")]
    pub user_agent: String,
    pub browser: String,
    pub browser_version: String,
    pub browser_lang: String,
    pub platform: String,
    #[serde(rename = "http-headers")]
    pub http_headers: BTreeMap<String, String>,
    pub timestamp: String,
    pub args: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub http_response: u16,
}

/// Build the alert for a resolved request.
pub fn build_alert<Tz: TimeZone>(
    request: &NormalizedRequest,
    resolution: &Resolution,
    now: DateTime<Tz>,
) -> AlertRecord
where
    Tz::Offset: std::fmt::Display,
{
    let ua = &request.user_agent;

    AlertRecord {
        token_note: or_none(resolution.note.as_deref()),
        host: or_none(request.url_root().as_deref()),
        path: request.full_path(),
        http_method: request.method.to_string(),
        token: or_none(request.first_arg().as_deref()),
        body: body_value(&request.body),
        sourceip: or_none(Some(request.client_ip.as_str())),
        user_agent: or_none(Some(ua.string.as_str())),
        browser: or_none(ua.browser.as_deref()),
        browser_version: or_none(ua.version.as_deref()),
        browser_lang: or_none(ua.language.as_deref()),
        platform: or_none(ua.platform.as_deref()),
        http_headers: request.headers.clone(),
        timestamp: iso_8601(&now),
        args: request.args_map(),
        form: request.form.clone(),
        http_response: resolution.status.as_u16(),
    }
}

/// `YYYY-MM-DDThh:mm:ss±hh:mm`.
pub fn iso_8601<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

fn or_none(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NONE.to_string(),
    }
}

fn body_value(body: &RequestBody) -> Value {
    match body {
        RequestBody::Empty => Value::String(NONE.to_string()),
        RequestBody::Json(value) if is_falsy(value) => Value::String(NONE.to_string()),
        RequestBody::Json(value) => value.clone(),
        RequestBody::Text(text) => Value::String(text.clone()),
        RequestBody::Opaque(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Empty or zero-valued JSON counts as no body: `null`, `false`, `0`, `""`,
/// `[]` and `{}`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::tests::normalized;
    use crate::traps::{resolve, TrapConfig};
    use chrono::{FixedOffset, Utc};

    const FIELDS: &[&str] = &[
        "token_note",
        "host",
        "path",
        "http_method",
        "token",
        "body",
        "sourceip",
        "user-agent",
        "browser",
        "browser_version",
        "browser_lang",
        "platform",
        "http-headers",
        "timestamp",
        "args",
        "form",
        "http_response",
    ];

    fn config() -> TrapConfig {
        serde_json::from_str(
            r#"{
                "traps": {
                    "/admin": {
                        "trap-note": "admin panel",
                        "trap-response": {"content-type": "text/html", "body": "admin.html"},
                        "uid": {"token-note": "vendor X", "token-response": {"content-type": "text/html", "body": "x.html"}}
                    }
                },
                "default-http-response": {"content-type": "text/html", "body": "404.html"}
            }"#,
        )
        .unwrap()
    }

    fn fixed_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(5 * 3600 + 30 * 60)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .unwrap()
    }

    #[test]
    fn bare_request_fills_every_field_with_none() {
        let req = normalized("GET", "/missing", &[], "");
        let alert = build_alert(&req, &resolve(&req, &config()), fixed_time());

        assert_eq!(alert.token_note, "None");
        assert_eq!(alert.host, "None");
        assert_eq!(alert.token, "None");
        assert_eq!(alert.body, Value::String("None".into()));
        assert_eq!(alert.user_agent, "None");
        assert_eq!(alert.browser, "None");
        assert_eq!(alert.browser_version, "None");
        assert_eq!(alert.browser_lang, "None");
        assert_eq!(alert.platform, "None");
        assert_eq!(alert.http_response, 404);
        assert_eq!(alert.path, "/missing?");

        let json = serde_json::to_value(&alert).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), FIELDS.len());
        for field in FIELDS {
            assert!(!object[*field].is_null(), "{} is null", field);
        }
    }

    #[test]
    fn token_hit_is_fully_populated() {
        let req = normalized(
            "POST",
            "/admin?uid=1337&lang=en",
            &[
                ("host", "decoy.example"),
                ("user-agent", "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0"),
                ("x-forwarded-for", "1.2.3.4, 5.6.7.8"),
            ],
            r#"{"x":1}"#,
        );
        let alert = build_alert(&req, &resolve(&req, &config()), fixed_time());

        assert_eq!(alert.token_note, "vendor X");
        assert_eq!(alert.host, "http://decoy.example/");
        assert_eq!(alert.path, "/admin?uid=1337&lang=en");
        assert_eq!(alert.http_method, "POST");
        assert_eq!(alert.token, "uid=1337");
        assert_eq!(alert.body, serde_json::json!({"x": 1}));
        assert_eq!(alert.sourceip, "1.2.3.4");
        assert_eq!(alert.browser, "firefox");
        assert_eq!(alert.browser_version, "121.0");
        assert_eq!(alert.platform, "linux");
        assert_eq!(alert.http_headers["X-Forwarded-For"], "1.2.3.4, 5.6.7.8");
        assert_eq!(alert.args.len(), 2);
        assert_eq!(alert.args["lang"], "en");
        assert_eq!(alert.http_response, 200);
        assert_eq!(alert.timestamp, "2024-03-09T07:05:01+05:30");
    }

    #[test]
    fn text_body_is_recorded_verbatim() {
        let req = normalized("PUT", "/admin", &[], "not-json");
        let alert = build_alert(&req, &resolve(&req, &config()), fixed_time());
        assert_eq!(alert.body, Value::String("not-json".into()));
        assert_eq!(alert.token_note, "admin panel");
    }

    #[test]
    fn falsy_json_body_is_none() {
        for body in ["{}", "[]", "\"\"", "null", "false", "0", "0.0", "-0"] {
            let req = normalized("POST", "/admin", &[], body);
            let alert = build_alert(&req, &resolve(&req, &config()), fixed_time());
            assert_eq!(alert.body, Value::String("None".into()), "{}", body);
        }

        for (body, expected) in [("1", serde_json::json!(1)), ("true", serde_json::json!(true)), ("[0]", serde_json::json!([0]))] {
            let req = normalized("POST", "/admin", &[], body);
            let alert = build_alert(&req, &resolve(&req, &config()), fixed_time());
            assert_eq!(alert.body, expected, "{}", body);
        }
    }

    #[test]
    fn utc_timestamp_has_zero_offset() {
        let utc = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(iso_8601(&utc), "2023-12-31T23:59:59+00:00");

        let west = FixedOffset::west_opt(3 * 3600).unwrap().with_ymd_and_hms(1997, 7, 16, 19, 20, 30).unwrap();
        assert_eq!(iso_8601(&west), "1997-07-16T19:20:30-03:00");
    }

    #[test]
    fn building_twice_differs_only_in_timestamp() {
        let req = normalized("GET", "/admin?uid=1", &[("user-agent", "curl/8.4.0")], "");
        let resolution = resolve(&req, &config());
        let first = build_alert(&req, &resolution, fixed_time());
        let mut second = build_alert(&req, &resolution, Utc::now());
        second.timestamp = first.timestamp.clone();
        assert_eq!(first, second);
    }
}
