use crate::console::ConsoleEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use wkp_client::StatsSource;

pub const STATS_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Background task that fetches stats right away and then on a fixed
/// interval, forwarding every attempt as a [`ConsoleEvent::StatsFetched`].
///
/// The task belongs to the poller: it is aborted on [`StatsPoller::shutdown`]
/// or when the poller is dropped, and it exits by itself once the receiving
/// side of the channel is gone.
pub struct StatsPoller {
    handle: Option<JoinHandle<()>>,
}

impl StatsPoller {
    pub fn spawn<S>(source: Arc<S>, interval: Duration, tx: UnboundedSender<ConsoleEvent>) -> Self
    where
        S: StatsSource + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let fetched = source.fetch_stats().await;

                if tx.send(ConsoleEvent::StatsFetched(fetched)).is_err() {
                    debug!("Console gone, stopping stats poller");
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the task and waits until it has been torn down.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
