//! Shutdown signal and bounded connection drain

use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

/// Run `server` to completion, allowing at most `deadline` once `stopping` fires.
///
/// Returns `None` when the drain is cut short.
pub async fn drain_within<F>(
    server: F,
    stopping: oneshot::Receiver<()>,
    deadline: Duration,
) -> Option<F::Output>
where
    F: Future,
{
    tokio::pin!(server);

    tokio::select! {
        output = &mut server => return Some(output),
        signalled = stopping => {
            // Sender dropped without a signal: nothing to bound
            if signalled.is_err() {
                return Some(server.await);
            }
        }
    }

    tokio::time::timeout(deadline, server).await.ok()
}
