//! Graceful shutdown coordinator.
//!
//! SIGINT (Ctrl+C) or SIGTERM cancels a [`CancellationToken`]. The sync loop
//! checks it between passes, in the poll sleep, and in rate-limit waits. A
//! second signal force-exits.

use std::sync::atomic::{AtomicU32, Ordering};

use tokio_util::sync::CancellationToken;

/// Exit status used when a second signal arrives before the loop has stopped.
const FORCE_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalResponse {
    Cancel,
    ForceExit,
}

/// Count one received signal and decide what it means.
fn on_signal(received: &AtomicU32, token: &CancellationToken) -> SignalResponse {
    if received.fetch_add(1, Ordering::SeqCst) == 0 {
        token.cancel();
        SignalResponse::Cancel
    } else {
        SignalResponse::ForceExit
    }
}

/// Wait for SIGINT or SIGTERM. `false` means the listener can no longer fire.
async fn next_signal(sigterm: &mut tokio::signal::unix::Signal) -> bool {
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.is_ok(),
        got = sigterm.recv() => got.is_some(),
    }
}

/// Install the signal listener and return the token it cancels.
pub(crate) fn install_signal_handler() -> anyhow::Result<CancellationToken> {
    use tokio::signal::unix::{signal, SignalKind};

    let token = CancellationToken::new();
    let mut sigterm = signal(SignalKind::terminate())?;

    let handler_token = token.clone();
    tokio::spawn(async move {
        let received = AtomicU32::new(0);
        while next_signal(&mut sigterm).await {
            match on_signal(&received, &handler_token) {
                SignalResponse::Cancel => {
                    tracing::info!("Received shutdown signal, finishing current pass...");
                    tracing::info!("Press Ctrl+C again to force exit");
                }
                SignalResponse::ForceExit => {
                    tracing::warn!("Force exit requested");
                    std::process::exit(FORCE_EXIT_CODE);
                }
            }
        }
        tracing::debug!("Signal listener closed");
    });

    Ok(token)
}
