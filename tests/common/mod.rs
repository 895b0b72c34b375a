//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::task::JoinHandle;

use honeytrap::alert::{AlertSink, AlertWriter};
use honeytrap::config::HoneytrapSettings;
use honeytrap::http::HttpServer;
use honeytrap::lifecycle::Shutdown;
use honeytrap::net;
use honeytrap::traps::parse_trap_config;

/// Trap table used by most integration tests.
pub const TRAPS: &str = r#"{
    "traps": {
        "/wp-login.php": {
            "trap-note": "wordpress login probe",
            "trap-response": {"content-type": "text/html", "body": "login.html"},
            "user": {"token-note": "user token planted in robots.txt"},
            "session": {"token-response": {"content-type": "application/json", "body": "session.json"}}
        },
        "/whoami": {
            "trap-note": "fingerprinting",
            "trap-response": {"content-type": "text/html", "body": "custom.html"}
        }
    },
    "default-http-response": {"content-type": "text/html", "body": "404.html"}
}"#;

/// A honeytrap running on an ephemeral local port.
pub struct Honeytrap {
    pub addr: SocketAddr,
    dir: PathBuf,
    alert_log: PathBuf,
    shutdown: Shutdown,
    server: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Honeytrap {
    pub async fn start(traps: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("honeytrap-it-{}", uuid::Uuid::new_v4()));
        let templates = dir.join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(templates.join("login.html"), "<form action=\"/wp-login.php\"></form>").unwrap();
        std::fs::write(templates.join("session.json"), r#"{"session": "expired"}"#).unwrap();
        std::fs::write(templates.join("404.html"), "<h1>Not Found</h1>").unwrap();
        std::fs::write(templates.join("custom.html"), "browser={{ browser }}").unwrap();

        let alert_log = dir.join("logs").join("alerts.jsonl");

        let mut settings = HoneytrapSettings::default();
        settings.listener.bind_address = "127.0.0.1:0".to_string();
        settings.responses.templates_dir = templates.to_string_lossy().into_owned();
        settings.alerts.log_path = Some(alert_log.to_string_lossy().into_owned());
        settings.alerts.stdout = false;

        let (sink, rx) = AlertSink::channel();
        let writer = AlertWriter::open(&settings.alerts, rx).await.unwrap();
        let writer = tokio::spawn(writer.run());

        let listener = net::bind(&settings.listener).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server = HttpServer::new(settings, parse_trap_config(traps).unwrap(), sink);
        let server_shutdown = shutdown.subscribe();
        let server = tokio::spawn(async move {
            server.run(listener, server_shutdown).await.unwrap();
        });

        Self { addr, dir, alert_log, shutdown, server, writer }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server, wait for the alert writer to drain, and return
    /// every alert line parsed as JSON.
    pub async fn stop(self) -> Vec<serde_json::Value> {
        self.shutdown.trigger();
        self.server.await.unwrap();
        self.writer.await.unwrap();

        let content = std::fs::read_to_string(&self.alert_log).unwrap_or_default();
        let alerts = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        let _ = std::fs::remove_dir_all(&self.dir);
        alerts
    }
}

/// Client that never reuses connections, so shutdown is not held up by
/// idle keep-alive sockets.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
