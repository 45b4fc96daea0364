//! Signal handling for batch cancellation
//!
//! Ctrl-C or SIGTERM cancels the shared token. The coordinator checks it
//! between requests, during pacing and during retry backoff.

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels a token when the process is asked to stop
pub struct SignalHandler {
    token: CancellationToken,
}

impl SignalHandler {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Spawn the task that waits for CTRL-C or SIGTERM
    ///
    /// The task also ends quietly when the token is cancelled elsewhere.
    pub fn setup(&self) -> JoinHandle<()> {
        let token = self.token.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                match signal::ctrl_c().await {
                    Ok(()) => info!("Ctrl+C signal received"),
                    Err(e) => {
                        warn!("Failed to install Ctrl+C handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                        info!("SIGTERM signal received");
                    }
                    Err(e) => {
                        warn!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received Ctrl+C, cancelling batch");
                },
                _ = terminate => {
                    info!("Received terminate signal, cancelling batch");
                },
                _ = token.cancelled() => {
                    return;
                },
            }

            token.cancel();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_handler_task_ends_when_token_cancelled() {
        let token = CancellationToken::new();
        let handle = SignalHandler::new(token.clone()).setup();

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        let result = timeout(Duration::from_millis(500), handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_handler_does_not_cancel_on_its_own() {
        let token = CancellationToken::new();
        let _handle = SignalHandler::new(token.clone()).setup();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!token.is_cancelled());
    }
}
