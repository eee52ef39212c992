//! Periodic drivers for the history poll and the health probe.
//!
//! Each tick spawns its own task so a slow request never delays the ticker;
//! overlapping polls are resolved by the synchronizer's guard.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::connectivity::ConnectivityMonitor;
use crate::synchronizer::MessageSynchronizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub poll_interval: Duration,
    pub health_interval: Duration,
}

/// Running poll and health tickers.
pub struct SyncScheduler {
    cancel: CancellationToken,
    tickers: Vec<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Starts both tickers. The first tick of each fires immediately.
    ///
    /// The recipient is read from `recipient` on every poll tick, so an
    /// address entered later takes effect on the next tick.
    pub fn start(
        synchronizer: Arc<MessageSynchronizer>,
        monitor: Arc<ConnectivityMonitor>,
        recipient: watch::Receiver<String>,
        config: ScheduleConfig,
    ) -> Self {
        let cancel = CancellationToken::new();

        let poll_ticker = spawn_ticker("poll", config.poll_interval, cancel.clone(), move || {
            let synchronizer = synchronizer.clone();
            let recipient = recipient.borrow().clone();
            async move {
                synchronizer.poll(&recipient).await;
            }
        });

        let health_ticker =
            spawn_ticker("health", config.health_interval, cancel.clone(), move || {
                let monitor = monitor.clone();
                async move {
                    monitor.probe().await;
                }
            });

        tracing::info!(
            "[Scheduler] Started (poll every {:?}, health every {:?})",
            config.poll_interval,
            config.health_interval
        );

        Self {
            cancel,
            tickers: vec![poll_ticker, health_ticker],
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stops both tickers. Requests already in flight run to completion.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for result in join_all(self.tickers).await {
            if let Err(e) = result {
                tracing::warn!("[Scheduler] Ticker ended abnormally: {}", e);
            }
        }
        tracing::info!("[Scheduler] Stopped");
    }
}

fn spawn_ticker<F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tracing::trace!("[Scheduler] {} tick", name);
                    tokio::spawn(tick());
                }
            }
        }
    })
}
