//! TLS configuration and certificate loading.

use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

use crate::config::schema::TlsConfig;

/// Error type for TLS setup.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("{kind} file not found: {}", .path.display())]
    Missing { kind: &'static str, path: PathBuf },
    #[error("failed to load certificate/key: {0}")]
    Load(#[from] std::io::Error),
}

/// Load the rustls configuration from PEM certificate and key files.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    if !cert_path.exists() {
        return Err(TlsError::Missing { kind: "Certificate", path: cert_path.to_path_buf() });
    }
    if !key_path.exists() {
        return Err(TlsError::Missing { kind: "Private key", path: key_path.to_path_buf() });
    }

    let tls = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::info!(cert = %cert_path.display(), "TLS certificate loaded");
    Ok(tls)
}
