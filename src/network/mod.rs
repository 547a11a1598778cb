//! Network module.
//!
//! Connects to the policy's servers in round-robin order, runs a session on
//! each, and fails over to the next server when a session ends.

mod session;
mod stream;
pub mod tls;

pub use session::serve;
pub use stream::BotStream;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::adapter::EventAdapter;
use crate::error::{SessionError, SessionResult};
use crate::policy::Server;
use crate::service::PolicyService;

/// Pause between a lost connection and the next attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Open a transport to `server`, with TLS when the entry asks for it.
pub async fn connect(server: &Server) -> SessionResult<BotStream> {
    let tcp_stream = TcpStream::connect((server.hostname.as_str(), server.port)).await?;
    if !server.secure {
        return Ok(BotStream::Plain(tcp_stream));
    }

    let tls_stream = tls::connect(tcp_stream, &server.hostname).await?;
    Ok(BotStream::Tls(Box::new(tls_stream)))
}

async fn connect_and_serve(service: &Arc<PolicyService>, server: &Server) -> SessionResult {
    let stream = connect(server).await?;
    info!(server = %server, tls = stream.is_tls(), "Connected");

    let mut adapter = EventAdapter::new(Arc::clone(service));
    serve(stream, &mut adapter).await
}

/// Keep the bot connected for as long as the process runs.
///
/// Returns only when the policy lists no servers at all.
pub async fn run(service: Arc<PolicyService>) -> SessionResult {
    loop {
        let server = service.next_server().ok_or(SessionError::NoServers)?;
        info!(server = %server, "Connecting");

        if let Err(e) = connect_and_serve(&service, &server).await {
            warn!(server = %server, error = %e, "Connection lost");
        }

        service.clear_channels();
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
