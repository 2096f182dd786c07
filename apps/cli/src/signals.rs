//! SIGINT/SIGTERM handling.

use console::style;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Cancel `token` on the first SIGINT or SIGTERM.
///
/// Later signals are swallowed so an abort in progress is not interrupted.
pub(crate) fn spawn_abort_listener(token: CancellationToken) {
    tokio::spawn(async move {
        let mut signals = match Signals::new() {
            Ok(signals) => signals,
            Err(e) => {
                warn!(error = %e, "cannot install signal handlers");
                return;
            }
        };

        if let Err(e) = signals.recv().await {
            warn!(error = %e, "signal listener failed");
            return;
        }

        println!("{}", style("\nAborting requests...").blue().bright());
        token.cancel();
        println!("{}", style("All requests ABORTED.").green());
        println!("See you!");

        while signals.recv().await.is_ok() {
            debug!("signal ignored, abort already in progress");
        }
    });
}

struct Signals {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl Signals {
    fn new() -> std::io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?,
        })
    }

    #[cfg(unix)]
    async fn recv(&mut self) -> std::io::Result<()> {
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = self.terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}
