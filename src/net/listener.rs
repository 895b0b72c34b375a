//! TCP listener binding.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("invalid bind address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let address: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|source| ListenerError::Address {
            address: config.bind_address.clone(),
            source,
        })?;

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind { address, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenerError::Bind { address, source })?;

    tracing::info!(
        address = %local_addr,
        max_connections = config.max_connections,
        "Listener bound"
    );

    Ok(listener)
}
