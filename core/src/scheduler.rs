//! Per-watch tick loops
//!
//! Each running watch gets its own tokio task that samples the wall clock
//! every 50 ms and pushes a refresh to the render sink. Loops are
//! wall-clock-driven: a tick that lands late simply renders the current
//! elapsed value, with no backlog catch-up. A loop exits on its own when its
//! watch is gone or paused, so an abort that races an in-flight tick never
//! leaves a stale refresh behind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::render::{DisplayFrame, RenderSink};
use crate::store::WatchBoard;
use crate::watch::now_ms;

/// Sampling interval for running watches.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Live tick tasks, keyed by watch id. Handles are session state: they are
/// never persisted, and a restored board starts with none.
#[derive(Debug, Default)]
pub struct TickScheduler {
    tasks: HashMap<u64, JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the tick loop for a watch. Any previous loop for the same id
    /// is cancelled first.
    pub fn start(&mut self, id: u64, board: Arc<RwLock<WatchBoard>>, sink: Arc<dyn RenderSink>) {
        self.cancel(id);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let board = board.read().await;
                // Removed or paused between ticks: stop without rendering
                let Some(watch) = board.get(id) else { break };
                if !watch.running {
                    break;
                }

                sink.refresh(DisplayFrame::for_watch(watch, now_ms()));
            }
        });

        self.tasks.insert(id, handle);
    }

    /// Cancel the tick loop for a watch, if one is live. Callers mutate the
    /// board before cancelling; the in-loop liveness check covers the gap.
    pub fn cancel(&mut self, id: u64) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    pub fn is_scheduled(&self, id: u64) -> bool {
        self.tasks.get(&id).map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
