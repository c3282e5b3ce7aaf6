//! Render boundary
//!
//! The core never draws anything. It pushes `DisplayFrame`s to whatever
//! sink the frontend registered: once immediately after every mutation, and
//! once per tick for each running watch.

use crate::watch::{Watch, format_elapsed};

/// One display refresh for a single watch.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub id: u64,
    pub label: String,
    /// `"HH:MM:SS"`, or `"MM:SS"` when under an hour
    pub main: String,
    /// Two-digit centiseconds
    pub centis: String,
    /// Goal progress 0–100; `None` when the goal text parses to nothing
    pub progress: Option<f64>,
    pub running: bool,
}

impl DisplayFrame {
    /// Snapshot a watch at the given wall-clock instant.
    pub fn for_watch(watch: &Watch, now_ms: i64) -> Self {
        let time = format_elapsed(watch.elapsed_at(now_ms));
        Self {
            id: watch.id,
            label: watch.label.clone(),
            main: time.main,
            centis: time.centis,
            progress: watch.progress_percent(now_ms),
            running: watch.running,
        }
    }
}

/// Consumer of display refreshes. Implementations must tolerate refreshes
/// for ids they have never seen (frames can race a removal).
pub trait RenderSink: Send + Sync {
    /// Refresh the display for one watch.
    fn refresh(&self, frame: DisplayFrame);

    /// Drop the display for a removed watch.
    fn clear(&self, id: u64);
}
