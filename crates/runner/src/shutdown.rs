//! Shutdown signals
//!
//! A handler that cannot be installed never counts as a received signal:
//! the remaining signal keeps being awaited instead.

use std::future::{Future, pending};
use std::io;

use log::warn;
use tokio::signal::unix::{SignalKind, signal};

use timeguard_validator::CancelToken;

/// Resolve on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                if stream.recv().await.is_none() {
                    pending::<()>().await;
                }
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                pending::<()>().await;
            }
        }
    };

    first_signal(tokio::signal::ctrl_c(), terminate).await;
}

async fn first_signal<I, T>(interrupt: I, terminate: T)
where
    I: Future<Output = io::Result<()>>,
    T: Future<Output = ()>,
{
    let interrupt = async {
        if let Err(e) = interrupt.await {
            warn!("Cannot listen for SIGINT: {}", e);
            pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}

/// Cancel `token` once a shutdown signal arrives
pub fn cancel_on_shutdown(token: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, aborting time validation");
        token.cancel();
    })
}
