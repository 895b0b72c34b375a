//! HTTP server setup and the catch-all trap handler.
//!
//! # Responsibilities
//! - Create Axum Router with a single handler for every path
//! - Wire up middleware (tracing, timeout, concurrency limit)
//! - Bound request bodies; an oversized body is answered 413 and still alerted
//! - Bind server to a plain or TLS listener
//! - Per request: normalize → resolve → alert → render

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::alert::{build_alert, AlertSink};
use crate::config::HoneytrapSettings;
use crate::http::request::{decode_path, normalize};
use crate::http::response::{empty_ok, ResponseRenderer};
use crate::observability::metrics;
use crate::traps::{resolve, TrapConfig};

/// Grace period for in-flight TLS connections on shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub traps: Arc<TrapConfig>,
    pub reserved_paths: Arc<[String]>,
    pub renderer: Arc<ResponseRenderer>,
    pub alerts: AlertSink,
    pub scheme: &'static str,
    pub max_body_size: usize,
}

impl AppState {
    fn is_reserved(&self, path: &str) -> bool {
        self.reserved_paths.iter().any(|p| p == path)
    }
}

/// HTTP server for the honeytrap responder.
pub struct HttpServer {
    router: Router,
    settings: HoneytrapSettings,
}

impl HttpServer {
    /// Create a new HTTP server over a frozen trap configuration.
    pub fn new(settings: HoneytrapSettings, traps: TrapConfig, alerts: AlertSink) -> Self {
        let state = AppState {
            traps: Arc::new(traps),
            reserved_paths: settings.traps.reserved_paths.clone().into(),
            renderer: Arc::new(ResponseRenderer::from_config(&settings.responses)),
            alerts,
            scheme: if settings.listener.tls.is_some() { "https" } else { "http" },
            max_body_size: settings.security.max_body_size,
        };

        let router = Self::build_router(&settings, state);
        Self { router, settings }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(settings: &HoneytrapSettings, state: AppState) -> Router {
        let handler = get(trap_handler).post(trap_handler).put(trap_handler);

        Router::new()
            .route("/", handler.clone())
            .route("/{*path}", handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(settings.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(settings.listener.max_connections))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server behind TLS on the configured bind address.
    pub async fn run_tls(
        self,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .settings
            .listener
            .bind_address
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the settings.
    pub fn settings(&self) -> &HoneytrapSettings {
        &self.settings
    }
}

/// Catch-all handler: every path and GET/POST/PUT land here.
async fn trap_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    if state.is_reserved(&decode_path(request.uri().path())) {
        metrics::record_request(&method, 200, start_time);
        return empty_ok();
    }

    let request_id = Uuid::new_v4();
    let (parts, body) = request.into_parts();
    let (body, rejected) = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => (bytes, false),
        Err(e) => {
            tracing::warn!(request_id = %request_id, peer = %peer, error = %e, "Request body rejected");
            (Bytes::new(), true)
        }
    };

    let normalized = normalize(&parts, body, peer, state.scheme);
    let mut resolution = resolve(&normalized, &state.traps);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %normalized.path,
        sourceip = %normalized.client_ip,
        status = resolution.status.as_u16(),
        default = resolution.is_default(),
        "Request resolved"
    );

    if rejected {
        resolution.status = StatusCode::PAYLOAD_TOO_LARGE;
        state
            .alerts
            .emit(build_alert(&normalized, &resolution, chrono::Local::now()));
        metrics::record_request(&method, 413, start_time);
        return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
    }

    if let Some(trap) = &resolution.trap {
        metrics::record_trap_hit(trap, resolution.token.as_deref());
    }

    state
        .alerts
        .emit(build_alert(&normalized, &resolution, chrono::Local::now()));

    match state.renderer.render(&resolution, &normalized.user_agent).await {
        Ok(response) => {
            metrics::record_request(&method, resolution.status.as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                body_ref = %resolution.body_ref,
                error = %e,
                "Failed to render response"
            );
            metrics::record_render_failure();
            metrics::record_request(&method, 500, start_time);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
