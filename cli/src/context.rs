use std::path::PathBuf;
use std::sync::Arc;

use lapwatch_core::{
    AppConfig, FileBackend, MemoryBackend, RenderSink, StorageBackend, WatchService,
};

use crate::sink::StdoutSink;

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the core service.
#[derive(Clone)]
pub struct CliContext {
    pub service: Arc<WatchService>,
    pub config: AppConfig,
}

impl CliContext {
    pub fn new() -> Self {
        let config = AppConfig::load();

        let backend: Arc<dyn StorageBackend> = match backend_dir(&config) {
            Some(dir) => Arc::new(FileBackend::new(dir)),
            None => {
                tracing::warn!("no data directory available; state will not persist");
                Arc::new(MemoryBackend::new())
            }
        };

        let sink: Arc<dyn RenderSink> = Arc::new(StdoutSink);
        Self {
            service: Arc::new(WatchService::new(backend, sink)),
            config,
        }
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}

fn backend_dir(config: &AppConfig) -> Option<PathBuf> {
    config.data_dir.clone().or_else(FileBackend::default_dir)
}
