//! Cancellable real-time tick source for the inflation simulation.
//!
//! The ticker never touches simulation state. It only sends its run token to
//! the host at a fixed period; the host feeds each token back through
//! [`InflationEngine::apply_tick`](super::InflationEngine::apply_tick), which
//! discards tokens from a retired run.
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::RunToken;

#[derive(Debug)]
pub struct Ticker {
    token: RunToken,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a task that sends `token` every `period`, starting one period
    /// from now. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(token: RunToken, period: Duration, sink: UnboundedSender<RunToken>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sink.send(token).is_err() {
                    break;
                }
            }
        });
        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Abort the task and wait for it to settle. No token is sent after
    /// this returns.
    pub async fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    log::warn!("inflation ticker ended abnormally: {err}");
                }
            }
        }
    }

    #[must_use]
    pub const fn token(&self) -> RunToken {
        self.token
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
