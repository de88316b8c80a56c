//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{error, info};

/// Wait for SIGTERM or SIGINT and return the signal that arrived.
///
/// When the handler cannot be installed this never resolves and the server
/// runs until killed.
pub async fn shutdown_signal() -> Option<i32> {
    let mut signals = match Signals::new([SIGTERM, SIGINT]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to install signal handler: {}", e);
            return futures::future::pending().await;
        }
    };
    let handle = signals.handle();

    let received = signals.next().await;
    if let Some(signal) = received {
        info!("Received signal: {}", signal);
    }
    handle.close();
    received
}
