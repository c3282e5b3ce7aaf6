//! Stdout render sink
//!
//! One line per refresh. Live ticks are chatty by design here; a graphical
//! frontend would repaint in place instead.

use lapwatch_core::{DisplayFrame, RenderSink};

pub struct StdoutSink;

impl RenderSink for StdoutSink {
    fn refresh(&self, frame: DisplayFrame) {
        let state = if frame.running { "run " } else { "stop" };
        let progress = frame
            .progress
            .map(|p| format!("  {p:>3.0}%"))
            .unwrap_or_default();
        let label = if frame.label.is_empty() {
            String::new()
        } else {
            format!("  {}", frame.label)
        };

        println!(
            "[{:>3}] {}  {}.{}{}{}",
            frame.id, state, frame.main, frame.centis, progress, label
        );
    }

    fn clear(&self, id: u64) {
        println!("[{id:>3}] removed");
    }
}
