//! Watch state model
//!
//! A `Watch` is one count-up stopwatch. Elapsed time is derived from
//! wall-clock timestamps rather than in-memory durations, so a watch that
//! was running when the process died resumes correctly after reload (see
//! `WatchBoard::reconcile`).
//!
//! Invariant: total elapsed at instant `now` is
//! `elapsed_ms + (running ? max(now - started_at, 0) : 0)`. It never goes
//! negative and is monotonically non-decreasing while running.

use serde::{Deserialize, Serialize};

use crate::goal::parse_goal;

/// One stopwatch: accumulated elapsed time plus an optional open running
/// segment anchored at a wall-clock instant (epoch milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watch {
    /// Unique within the board, monotonically assigned, never reused in a
    /// session
    pub id: u64,

    /// Free-form display label
    #[serde(default)]
    pub label: String,

    /// Free-form goal text, re-parsed on every read (live-edit semantics)
    #[serde(default)]
    pub goal_text: String,

    /// Accumulated running time while NOT currently running
    #[serde(default)]
    pub elapsed_ms: u64,

    #[serde(default)]
    pub running: bool,

    /// Start of the current running segment; only meaningful while running,
    /// and only persisted while running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
}

impl Watch {
    /// A fresh zeroed watch: empty label and goal, not running.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            label: String::new(),
            goal_text: String::new(),
            elapsed_ms: 0,
            running: false,
            started_at: None,
        }
    }

    /// Open a running segment at `now_ms`. No-op if already running.
    pub fn start(&mut self, now_ms: i64) {
        if self.running {
            return;
        }
        self.started_at = Some(now_ms);
        self.running = true;
    }

    /// Fold the open running segment into `elapsed_ms` and stop. No-op if
    /// not running.
    pub fn pause(&mut self, now_ms: i64) {
        if !self.running {
            return;
        }
        self.elapsed_ms = self.elapsed_at(now_ms);
        self.running = false;
        self.started_at = None;
    }

    /// Zero the watch. Idempotent; the caller cancels any tick loop and
    /// forces one display refresh.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.running = false;
        self.started_at = None;
    }

    /// Total elapsed time at `now_ms`. Pure read; a running segment whose
    /// anchor sits in the future (clock skew) contributes zero.
    pub fn elapsed_at(&self, now_ms: i64) -> u64 {
        let open = match (self.running, self.started_at) {
            (true, Some(t0)) => (now_ms - t0).max(0) as u64,
            _ => 0,
        };
        self.elapsed_ms + open
    }

    /// Goal progress at `now_ms`, clamped to 100. `None` when the goal text
    /// parses to nothing, in which case no progress indicator is shown.
    pub fn progress_percent(&self, now_ms: i64) -> Option<f64> {
        let goal = parse_goal(&self.goal_text);
        if goal == 0 {
            return None;
        }
        let percent = self.elapsed_at(now_ms) as f64 / goal as f64 * 100.0;
        Some(percent.min(100.0))
    }
}

/// Formatted display values for one elapsed reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedTime {
    /// `"HH:MM:SS"`, or `"MM:SS"` when under an hour
    pub main: String,
    /// Two-digit centiseconds
    pub centis: String,
}

/// Format an elapsed reading for display, zero-padded to width 2.
pub fn format_elapsed(ms: u64) -> FormattedTime {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1_000;
    let cs = (ms % 1_000) / 10;

    let main = if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    };

    FormattedTime {
        main,
        centis: format!("{cs:02}"),
    }
}

/// Current wall-clock instant in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_sums_running_segments() {
        let mut w = Watch::new(1);

        w.start(1_000);
        assert_eq!(w.elapsed_at(1_500), 500);
        w.pause(2_000);
        assert_eq!(w.elapsed_at(2_000), 1_000);

        // Gap while paused does not count
        assert_eq!(w.elapsed_at(9_000), 1_000);

        w.start(10_000);
        w.pause(10_250);
        assert_eq!(w.elapsed_at(10_250), 1_250);
    }

    #[test]
    fn elapsed_is_monotonic_while_running() {
        let mut w = Watch::new(1);
        w.start(0);

        let mut last = 0;
        for now in [0, 125, 126, 5_000, 100_000] {
            let e = w.elapsed_at(now);
            assert!(e >= last, "elapsed went backwards at t={now}");
            last = e;
        }
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut w = Watch::new(1);
        w.start(1_000);
        w.start(5_000);
        assert_eq!(w.started_at, Some(1_000));
        assert_eq!(w.elapsed_at(6_000), 5_000);
    }

    #[test]
    fn pause_while_paused_is_noop() {
        let mut w = Watch::new(1);
        w.pause(1_000);
        assert_eq!(w.elapsed_ms, 0);
        assert!(!w.running);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut w = Watch::new(1);
        w.start(0);
        w.pause(3_000);

        w.reset();
        let once = w.clone();
        w.reset();

        assert_eq!(w.elapsed_ms, once.elapsed_ms);
        assert_eq!(w.elapsed_ms, 0);
        assert!(!w.running);
        assert_eq!(w.started_at, None);
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        let mut w = Watch::new(1);
        w.elapsed_ms = 400;
        w.start(10_000);
        // Sampled before the recorded start
        assert_eq!(w.elapsed_at(9_000), 400);
    }

    #[test]
    fn progress_clamps_at_hundred() {
        let mut w = Watch::new(1);
        w.goal_text = "1s".to_string();
        w.elapsed_ms = 500;
        assert_eq!(w.progress_percent(0), Some(50.0));

        w.elapsed_ms = 5_000;
        assert_eq!(w.progress_percent(0), Some(100.0));
    }

    #[test]
    fn no_goal_means_no_progress() {
        let mut w = Watch::new(1);
        w.elapsed_ms = 500;
        assert_eq!(w.progress_percent(0), None);

        w.goal_text = "soon".to_string();
        assert_eq!(w.progress_percent(0), None);
    }

    #[test]
    fn format_under_an_hour() {
        let t = format_elapsed(125);
        assert_eq!(t.main, "00:00");
        assert_eq!(t.centis, "12");

        let t = format_elapsed(65_430);
        assert_eq!(t.main, "01:05");
        assert_eq!(t.centis, "43");
    }

    #[test]
    fn format_with_hours() {
        let t = format_elapsed(3_600_000 + 2 * 60_000 + 3_000 + 40);
        assert_eq!(t.main, "01:02:03");
        assert_eq!(t.centis, "04");
    }
}
