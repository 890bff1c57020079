use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long SIGTERM keeps serving in-flight requests while readiness
/// reports unavailable.
pub const DRAIN_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Running,
    /// Still serving, but readiness fails so balancers stop routing here
    Draining,
    /// The server stops accepting and finishes open connections
    Stopping,
}

/// Process-wide shutdown phase shared by the server, the readiness
/// probe and the signal listener. Phases only move forward.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<Phase>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Phase::Running);
        Self { tx: Arc::new(tx) }
    }

    pub fn phase(&self) -> Phase {
        *self.tx.borrow()
    }

    /// True once draining or stopping has begun
    pub fn is_shutting_down(&self) -> bool {
        self.phase() > Phase::Running
    }

    pub fn drain(&self) {
        self.advance(Phase::Draining);
    }

    pub fn stop(&self) {
        self.advance(Phase::Stopping);
    }

    fn advance(&self, next: Phase) {
        self.tx.send_if_modified(|phase| {
            if *phase < next {
                *phase = next;
                true
            } else {
                false
            }
        });
    }

    /// Resolves once the phase reaches [`Phase::Stopping`]
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|phase| *phase == Phase::Stopping).await;
    }

    /// Drive the phase from process signals: SIGINT stops at once,
    /// SIGTERM drains for [`DRAIN_PERIOD`] first.
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            let (mut sigint, mut sigterm) =
                match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                    (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::error!("failed to install signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("SIGINT received, stopping");
                    shutdown.stop();
                }
                _ = sigterm.recv() => {
                    tracing::info!(drain_secs = DRAIN_PERIOD.as_secs(), "SIGTERM received, draining");
                    shutdown.drain_then_stop(DRAIN_PERIOD).await;
                }
                _ = shutdown.stopped() => {}
            }
        })
    }

    async fn drain_then_stop(&self, period: Duration) {
        self.drain();
        tokio::select! {
            _ = tokio::time::sleep(period) => self.stop(),
            _ = self.stopped() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_never_moves_back() {
        let shutdown = Shutdown::new();
        assert!(!shutdown.is_shutting_down());

        shutdown.stop();
        shutdown.drain();
        assert_eq!(shutdown.phase(), Phase::Stopping);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_precedes_stop() {
        let shutdown = Shutdown::new();
        let draining = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.drain_then_stop(DRAIN_PERIOD).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(shutdown.phase(), Phase::Draining);

        tokio::time::advance(DRAIN_PERIOD).await;
        draining.await.unwrap();
        assert_eq!(shutdown.phase(), Phase::Stopping);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_stop_cuts_drain_short() {
        let shutdown = Shutdown::new();
        let draining = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.drain_then_stop(DRAIN_PERIOD).await })
        };
        tokio::task::yield_now().await;

        shutdown.stop();
        draining.await.unwrap();
        shutdown.stopped().await;
    }
}
