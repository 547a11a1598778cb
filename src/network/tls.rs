//! TLS client handshake against the system trust store.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{info, warn};

use crate::error::{SessionError, SessionResult};

fn native_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }
    roots
}

/// Wrap `tcp_stream` in TLS, verifying the certificate for `hostname`.
pub async fn connect(tcp_stream: TcpStream, hostname: &str) -> SessionResult<TlsStream<TcpStream>> {
    let config = ClientConfig::builder()
        .with_root_certificates(native_roots())
        .with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(hostname.to_owned())
        .map_err(|_| SessionError::InvalidServerName(hostname.to_owned()))?;

    let tls_stream = connector.connect(server_name, tcp_stream).await?;
    info!(hostname = %hostname, "TLS handshake completed");

    Ok(tls_stream)
}
