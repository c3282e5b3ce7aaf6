pub mod config;
pub mod error;
pub mod goal;
pub mod render;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod store;
pub mod watch;

#[cfg(test)]
mod service_tests;

// Re-exports for convenience
pub use config::AppConfig;
pub use error::{ConfigError, StorageError};
pub use goal::parse_goal;
pub use render::{DisplayFrame, RenderSink};
pub use scheduler::{TICK_INTERVAL, TickScheduler};
pub use service::WatchService;
pub use storage::{BOARD_KEY, FileBackend, MemoryBackend, StorageBackend};
pub use store::WatchBoard;
pub use watch::{FormattedTime, Watch, format_elapsed, now_ms};
