//! Tests for the user action boundary and tick scheduling
//!
//! Drive a `WatchService` against an in-memory backend and a recording sink,
//! then assert on the frames that reached the render boundary.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::sleep;

use crate::render::{DisplayFrame, RenderSink};
use crate::service::WatchService;
use crate::storage::{BOARD_KEY, MemoryBackend, StorageBackend};
use crate::watch::now_ms;

#[derive(Default)]
struct RecordingSink {
    frames: Mutex<Vec<DisplayFrame>>,
    cleared: Mutex<Vec<u64>>,
}

impl RecordingSink {
    fn frames_for(&self, id: u64) -> Vec<DisplayFrame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|f| f.id == id)
            .cloned()
            .collect()
    }

    fn cleared_ids(&self) -> Vec<u64> {
        self.cleared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RenderSink for RecordingSink {
    fn refresh(&self, frame: DisplayFrame) {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
    }

    fn clear(&self, id: u64) {
        self.cleared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id);
    }
}

fn make_service() -> (Arc<WatchService>, Arc<MemoryBackend>, Arc<RecordingSink>) {
    let backend = Arc::new(MemoryBackend::new());
    let sink = Arc::new(RecordingSink::default());
    let service = Arc::new(WatchService::new(
        Arc::clone(&backend) as Arc<dyn StorageBackend>,
        Arc::clone(&sink) as Arc<dyn RenderSink>,
    ));
    (service, backend, sink)
}

#[tokio::test]
async fn first_run_seeds_three_empty_watches() {
    let (service, backend, sink) = make_service();
    service.load().await;

    let watches = service.snapshot().await;
    let ids: Vec<u64> = watches.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(watches.iter().all(|w| !w.running && w.elapsed_ms == 0));

    // Seeded state was persisted and painted
    let blob = backend.get(BOARD_KEY).unwrap().unwrap();
    assert!(blob.contains("\"id\":1"));
    assert_eq!(sink.frames_for(2).len(), 1);
}

#[tokio::test]
async fn add_watch_extends_the_board_and_persists() {
    let (service, backend, sink) = make_service();
    service.load().await;

    let id = service.add_watch().await;
    assert_eq!(id, 4);
    assert_eq!(service.snapshot().await.len(), 4);

    let blob = backend.get(BOARD_KEY).unwrap().unwrap();
    assert!(blob.contains("\"id\":4"));
    assert_eq!(sink.frames_for(4).len(), 1);
}

#[tokio::test]
async fn toggle_starts_a_tick_loop() {
    let (service, _backend, sink) = make_service();
    let id = service.add_watch().await;

    service.toggle(id).await;
    assert!(service.is_scheduled(id).await);

    sleep(Duration::from_millis(200)).await;

    let frames = sink.frames_for(id);
    // One immediate refresh from the toggle plus several 50 ms ticks
    assert!(frames.len() >= 3, "expected ticks, got {} frames", frames.len());
    assert!(frames[1..].iter().all(|f| f.running));
}

#[tokio::test]
async fn toggle_again_pauses_and_freezes_elapsed() {
    let (service, _backend, sink) = make_service();
    let id = service.add_watch().await;

    service.toggle(id).await;
    sleep(Duration::from_millis(120)).await;
    service.toggle(id).await;

    let watches = service.snapshot().await;
    let w = &watches[0];
    assert!(!w.running);
    assert!(w.elapsed_ms >= 100, "elapsed froze too early: {}", w.elapsed_ms);
    assert_eq!(w.started_at, None);
    assert!(!service.is_scheduled(id).await);

    // No further ticks fire after the pause
    let frozen = w.elapsed_ms;
    let frames_after_pause = sink.frames_for(id).len();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(sink.frames_for(id).len(), frames_after_pause);
    assert_eq!(service.snapshot().await[0].elapsed_ms, frozen);
}

#[tokio::test]
async fn remove_while_running_stops_all_frames_for_that_id() {
    let (service, _backend, sink) = make_service();
    let id = service.add_watch().await;
    let other = service.add_watch().await;

    service.toggle(id).await;
    service.toggle(other).await;
    sleep(Duration::from_millis(100)).await;

    service.remove(id).await;
    assert_eq!(sink.cleared_ids(), vec![id]);
    assert!(!service.is_scheduled(id).await);

    let frames_at_removal = sink.frames_for(id).len();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(
        sink.frames_for(id).len(),
        frames_at_removal,
        "orphaned tick fired after removal"
    );

    // The other watch keeps ticking
    assert!(service.is_scheduled(other).await);
    let other_frames = sink.frames_for(other).len();
    sleep(Duration::from_millis(100)).await;
    assert!(sink.frames_for(other).len() > other_frames);
}

#[tokio::test]
async fn reset_zeroes_and_pushes_one_refresh() {
    let (service, _backend, sink) = make_service();
    let id = service.add_watch().await;

    service.toggle(id).await;
    sleep(Duration::from_millis(80)).await;
    service.reset(id).await;

    let watches = service.snapshot().await;
    let w = &watches[0];
    assert_eq!(w.elapsed_ms, 0);
    assert!(!w.running);
    assert!(!service.is_scheduled(id).await);

    let frames = sink.frames_for(id);
    let last = frames.last().unwrap();
    assert_eq!(last.main, "00:00");
    assert_eq!(last.centis, "00");
    assert!(!last.running);

    // Second reset leaves the same state
    service.reset(id).await;
    let watches = service.snapshot().await;
    assert_eq!(watches[0].elapsed_ms, 0);
    assert!(!watches[0].running);
}

#[tokio::test]
async fn reload_resumes_a_running_watch_across_the_gap() {
    let started = now_ms() - 5_000;
    let blob = format!(
        r#"[{{"id":7,"label":"laundry","goal_text":"10s","elapsed_ms":1000,"running":true,"started_at":{started}}}]"#
    );
    let backend = Arc::new(MemoryBackend::with_entry(BOARD_KEY, &blob));
    let sink = Arc::new(RecordingSink::default());
    let service = WatchService::new(
        Arc::clone(&backend) as Arc<dyn StorageBackend>,
        Arc::clone(&sink) as Arc<dyn RenderSink>,
    );

    service.load().await;

    // E + (T1 - T0): the whole downtime folds into elapsed
    let watches = service.snapshot().await;
    assert_eq!(watches.len(), 1, "restored board must not be re-seeded");
    let w = &watches[0];
    assert!(w.running);
    assert!(
        (6_000..6_500).contains(&w.elapsed_ms),
        "reload gap not folded: {}",
        w.elapsed_ms
    );

    // The tick loop resumed without any user action
    assert!(service.is_scheduled(7).await);
    sleep(Duration::from_millis(120)).await;
    assert!(sink.frames_for(7).len() >= 2);
}

#[tokio::test]
async fn paused_watch_stays_paused_across_reload() {
    let blob = r#"[{"id":3,"label":"","goal_text":"","elapsed_ms":4200,"running":false}]"#;
    let backend = Arc::new(MemoryBackend::with_entry(BOARD_KEY, blob));
    let sink = Arc::new(RecordingSink::default());
    let service = WatchService::new(
        Arc::clone(&backend) as Arc<dyn StorageBackend>,
        Arc::clone(&sink) as Arc<dyn RenderSink>,
    );

    service.load().await;

    let watches = service.snapshot().await;
    let w = &watches[0];
    assert!(!w.running);
    assert_eq!(w.elapsed_ms, 4_200);
    assert!(!service.is_scheduled(3).await);
}

#[tokio::test]
async fn unknown_ids_are_silent_noops() {
    let (service, _backend, sink) = make_service();
    service.load().await;
    let before = service.snapshot().await.len();

    service.toggle(99).await;
    service.reset(99).await;
    service.remove(99).await;
    service.edit_label(99, "ghost").await;
    service.edit_goal(99, "5m").await;

    assert_eq!(service.snapshot().await.len(), before);
    assert!(sink.frames_for(99).is_empty());
    assert!(sink.cleared_ids().is_empty());
}

#[tokio::test]
async fn edits_persist_immediately_and_refresh_progress() {
    let (service, backend, sink) = make_service();
    let id = service.add_watch().await;

    service.edit_label(id, "stretching").await;
    service.edit_goal(id, "30min").await;

    let blob = backend.get(BOARD_KEY).unwrap().unwrap();
    assert!(blob.contains("stretching"));
    assert!(blob.contains("30min"));

    let frames = sink.frames_for(id);
    let last = frames.last().unwrap();
    assert_eq!(last.label, "stretching");
    assert_eq!(last.progress, Some(0.0));
}
