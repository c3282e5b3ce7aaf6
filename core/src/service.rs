//! User action boundary
//!
//! `WatchService` ties the board, the storage backend, the render sink, and
//! the tick scheduler together. Every mutation re-serializes the whole board
//! to the backend (single writer, last write wins — no multi-watch
//! atomicity needed) and pushes one immediate display refresh for the
//! affected watch. Unknown ids are silent no-ops everywhere: an id can
//! vanish between a frontend event being queued and it arriving here.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::render::{DisplayFrame, RenderSink};
use crate::scheduler::TickScheduler;
use crate::storage::{BOARD_KEY, StorageBackend};
use crate::store::WatchBoard;
use crate::watch::{Watch, now_ms};

pub struct WatchService {
    board: Arc<RwLock<WatchBoard>>,
    backend: Arc<dyn StorageBackend>,
    sink: Arc<dyn RenderSink>,
    scheduler: Mutex<TickScheduler>,
}

impl WatchService {
    pub fn new(backend: Arc<dyn StorageBackend>, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            board: Arc::new(RwLock::new(WatchBoard::new())),
            backend,
            sink,
            scheduler: Mutex::new(TickScheduler::new()),
        }
    }

    /// Load persisted state, reconcile the reload gap, resume in-flight
    /// watches, and seed the default board on a first run. Runs once at
    /// startup, before any tick.
    pub async fn load(&self) {
        let blob = match self.backend.get(BOARD_KEY) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "failed to read persisted watches; starting empty");
                None
            }
        };

        let mut restored = WatchBoard::deserialize(blob.as_deref().unwrap_or(""));
        let resumed = restored.reconcile(now_ms());

        if restored.is_empty() {
            restored.seed_defaults();
        }

        self.persist(&restored);

        {
            let mut board = self.board.write().await;
            *board = restored;
        }

        // Initial paint for every watch, then resume tick loops
        let board = self.board.read().await;
        let now = now_ms();
        for w in board.iter() {
            self.sink.refresh(DisplayFrame::for_watch(w, now));
        }
        drop(board);

        let mut scheduler = self.scheduler.lock().await;
        for id in resumed {
            debug!(id, "resuming watch across reload");
            scheduler.start(id, Arc::clone(&self.board), Arc::clone(&self.sink));
        }
    }

    /// Create a new empty watch and return its id.
    pub async fn add_watch(&self) -> u64 {
        let mut board = self.board.write().await;
        let frame = DisplayFrame::for_watch(board.create(), now_ms());
        let id = frame.id;
        self.persist(&board);
        drop(board);

        self.sink.refresh(frame);
        id
    }

    /// Remove a watch and halt its tick loop. No-op on unknown id.
    pub async fn remove(&self, id: u64) {
        let mut board = self.board.write().await;
        if !board.remove(id) {
            return;
        }
        self.persist(&board);
        drop(board);

        self.scheduler.lock().await.cancel(id);
        self.sink.clear(id);
    }

    /// Combined start/pause: a running watch pauses and its loop is
    /// cancelled; a stopped watch starts and gets a loop.
    pub async fn toggle(&self, id: u64) {
        let now = now_ms();

        let mut board = self.board.write().await;
        let Some(watch) = board.get_mut(id) else { return };

        let was_running = watch.running;
        if was_running {
            watch.pause(now);
        } else {
            watch.start(now);
        }
        let frame = DisplayFrame::for_watch(watch, now);
        self.persist(&board);
        drop(board);

        self.sink.refresh(frame);

        let mut scheduler = self.scheduler.lock().await;
        if was_running {
            scheduler.cancel(id);
        } else {
            scheduler.start(id, Arc::clone(&self.board), Arc::clone(&self.sink));
        }
    }

    /// Zero a watch, cancel its loop, and force one refresh showing zero.
    pub async fn reset(&self, id: u64) {
        let mut board = self.board.write().await;
        let Some(watch) = board.get_mut(id) else { return };

        watch.reset();
        let frame = DisplayFrame::for_watch(watch, now_ms());
        self.persist(&board);
        drop(board);

        self.scheduler.lock().await.cancel(id);
        self.sink.refresh(frame);
    }

    /// Update a watch label. No-op on unknown id.
    pub async fn edit_label(&self, id: u64, text: &str) {
        self.edit(id, |w| w.label = text.to_string()).await;
    }

    /// Update a watch goal. The text is stored verbatim and re-parsed on
    /// every read, so mid-edit values are fine.
    pub async fn edit_goal(&self, id: u64, text: &str) {
        self.edit(id, |w| w.goal_text = text.to_string()).await;
    }

    async fn edit(&self, id: u64, apply: impl FnOnce(&mut Watch)) {
        let mut board = self.board.write().await;
        let Some(watch) = board.get_mut(id) else { return };

        apply(watch);
        let frame = DisplayFrame::for_watch(watch, now_ms());
        self.persist(&board);
        drop(board);

        self.sink.refresh(frame);
    }

    /// Copy of the current board state, in display order.
    pub async fn snapshot(&self) -> Vec<Watch> {
        self.board.read().await.iter().cloned().collect()
    }

    /// Whether a tick loop is currently live for this id.
    pub async fn is_scheduled(&self, id: u64) -> bool {
        self.scheduler.lock().await.is_scheduled(id)
    }

    /// Re-serialize the whole board. Backend failures degrade to a warning;
    /// the in-memory state stays authoritative for this session.
    fn persist(&self, board: &WatchBoard) {
        if let Err(e) = self.backend.set(BOARD_KEY, &board.serialize()) {
            warn!(error = %e, "failed to persist watches");
        }
    }
}
