//! Background refresh triggers.

use std::sync::Arc;
use std::time::Duration;

use quad_events::{EventBus, Topic};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::SyncEngine;
use crate::source::LocationSource;

/// Runs [`SyncEngine::refresh`] on a fixed interval and whenever the app
/// regains focus. The first tick fires immediately.
///
/// Failures are logged and left for the next trigger; nothing is retried
/// early.
pub struct SyncScheduler<S> {
    engine: Arc<SyncEngine<S>>,
    period: Duration,
}

impl<S: LocationSource> SyncScheduler<S> {
    pub const fn new(engine: Arc<SyncEngine<S>>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// Start the trigger loop on the current runtime. Abort the handle to
    /// stop it.
    pub fn spawn(self, bus: &EventBus) -> JoinHandle<()> {
        let mut focus = bus.stream(&[Topic::FocusRegained]);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let trigger = tokio::select! {
                    _ = ticker.tick() => "interval",
                    Some(_) = focus.recv() => "focus",
                    else => break,
                };
                tracing::debug!(trigger, "scheduled location refresh");
                if let Err(error) = self.engine.refresh().await {
                    tracing::warn!(%error, trigger, "scheduled refresh failed");
                }
            }
        })
    }
}
