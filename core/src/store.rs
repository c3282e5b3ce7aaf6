//! Ordered watch collection, persistence codec, and startup reconciliation.
//!
//! The board owns every `Watch`; insertion order is display order. Ids are
//! unique across the board and the counter is restored from the maximum
//! persisted id on load, so new ids never collide with restored ones.
//! Scheduling handles are session state and live in `TickScheduler`, never
//! here and never in the persisted blob.

use tracing::warn;

use crate::watch::Watch;

/// Number of empty watches seeded on a first run (empty store).
pub const DEFAULT_WATCH_COUNT: usize = 3;

/// Ordered collection of watches plus the id counter.
#[derive(Debug, Default)]
pub struct WatchBoard {
    watches: Vec<Watch>,
    /// Highest id assigned or restored so far
    id_counter: u64,
}

impl WatchBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh zeroed watch with the next id and return it.
    pub fn create(&mut self) -> &Watch {
        self.id_counter += 1;
        self.watches.push(Watch::new(self.id_counter));
        self.watches.last().expect("just pushed")
    }

    /// Remove a watch, keeping the order of the rest. Returns whether the
    /// id existed; unknown ids are a silent no-op for callers.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.watches.len();
        self.watches.retain(|w| w.id != id);
        self.watches.len() < before
    }

    pub fn get(&self, id: u64) -> Option<&Watch> {
        self.watches.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Watch> {
        self.watches.iter_mut().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Watch> {
        self.watches.iter()
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Encode the board as one JSON blob. `started_at` is emitted only for
    /// running watches.
    pub fn serialize(&self) -> String {
        serde_json::to_string(&self.watches).unwrap_or_else(|e| {
            warn!(error = %e, "failed to encode watch board; persisting empty");
            "[]".to_string()
        })
    }

    /// Decode a board from a persisted blob. An empty or malformed blob
    /// yields an empty board; this is never an error. Restored watches have
    /// no scheduling handle regardless of their persisted `running` flag —
    /// `reconcile` decides what resumes.
    pub fn deserialize(blob: &str) -> Self {
        if blob.trim().is_empty() {
            return Self::new();
        }

        let mut watches: Vec<Watch> = match serde_json::from_str(blob) {
            Ok(watches) => watches,
            Err(e) => {
                warn!(error = %e, "malformed watch data; starting with an empty board");
                return Self::new();
            }
        };

        // A stale anchor on a paused watch carries no meaning
        for w in &mut watches {
            if !w.running {
                w.started_at = None;
            }
        }

        let id_counter = watches.iter().map(|w| w.id).max().unwrap_or(0);
        Self {
            watches,
            id_counter,
        }
    }

    /// Startup reconciliation: fold the reload gap into every watch that was
    /// persisted mid-run, re-anchor it at `now_ms`, and return the ids whose
    /// tick loops must resume. The gap is uncapped: a watch that was running
    /// is treated as having kept running the whole time the process was
    /// down. Paused watches are untouched. Runs once, before any tick.
    pub fn reconcile(&mut self, now_ms: i64) -> Vec<u64> {
        let mut resumed = Vec::new();

        for w in &mut self.watches {
            match (w.running, w.started_at) {
                (true, Some(t0)) => {
                    w.elapsed_ms += (now_ms - t0).max(0) as u64;
                    w.started_at = Some(now_ms);
                    resumed.push(w.id);
                }
                (true, None) => {
                    // Running without an anchor cannot be resumed meaningfully
                    warn!(id = w.id, "running watch restored without a start timestamp; pausing");
                    w.running = false;
                }
                _ => {}
            }
        }

        resumed
    }

    /// Seed the default starting state: exactly three empty watches.
    pub fn seed_defaults(&mut self) {
        for _ in 0..DEFAULT_WATCH_COUNT {
            self.create();
        }
    }
}
