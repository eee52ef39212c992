//! ConnectivityMonitor - tracks backend reachability from the health probe.

use helpline_core::backend::ChatBackend;
use helpline_core::connectivity::ConnectivityState;
use helpline_core::event::{EventSender, SyncEvent};
use std::sync::{Arc, Mutex};

/// Owns the last observed `ConnectivityState`.
///
/// The state is `Online` iff the most recently completed probe succeeded.
/// `ConnectivityChanged` is emitted only on transitions.
pub struct ConnectivityMonitor {
    backend: Arc<dyn ChatBackend>,
    events: EventSender,
    state: Mutex<ConnectivityState>,
}

impl ConnectivityMonitor {
    pub fn new(backend: Arc<dyn ChatBackend>, events: EventSender) -> Self {
        Self {
            backend,
            events,
            state: Mutex::new(ConnectivityState::Unknown),
        }
    }

    pub fn state(&self) -> ConnectivityState {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one health probe and records the result.
    pub async fn probe(&self) -> ConnectivityState {
        let observed = match self.backend.health().await {
            Ok(()) => ConnectivityState::Online,
            Err(e) => {
                tracing::debug!("[Connectivity] Health probe failed: {}", e);
                ConnectivityState::Offline
            }
        };

        let previous = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::replace(&mut *state, observed)
        };

        if previous != observed {
            tracing::info!(
                "[Connectivity] Backend is {} (was {})",
                observed.label(),
                previous.label()
            );
            if self
                .events
                .send(SyncEvent::ConnectivityChanged { state: observed })
                .is_err()
            {
                tracing::debug!("[Connectivity] Renderer is gone, event dropped");
            }
        }

        observed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedBackend, drain};
    use helpline_core::event::event_channel;

    #[tokio::test]
    async fn test_state_follows_latest_probe() {
        let backend = Arc::new(ScriptedBackend::new());
        let (tx, _rx) = event_channel();
        let monitor = ConnectivityMonitor::new(backend.clone(), tx);
        assert_eq!(monitor.state(), ConnectivityState::Unknown);

        assert_eq!(monitor.probe().await, ConnectivityState::Online);
        assert_eq!(monitor.state(), ConnectivityState::Online);

        backend.set_healthy(false);
        assert_eq!(monitor.probe().await, ConnectivityState::Offline);
        assert_eq!(monitor.state(), ConnectivityState::Offline);

        backend.set_healthy(true);
        monitor.probe().await;
        assert_eq!(monitor.state(), ConnectivityState::Online);
        assert_eq!(backend.health_calls(), 3);
    }

    #[tokio::test]
    async fn test_emits_only_on_transition() {
        let backend = Arc::new(ScriptedBackend::new());
        let (tx, mut rx) = event_channel();
        let monitor = ConnectivityMonitor::new(backend.clone(), tx);

        monitor.probe().await;
        monitor.probe().await;
        backend.set_healthy(false);
        monitor.probe().await;
        monitor.probe().await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SyncEvent::ConnectivityChanged {
                    state: ConnectivityState::Online
                },
                SyncEvent::ConnectivityChanged {
                    state: ConnectivityState::Offline
                },
            ]
        );
    }
}
