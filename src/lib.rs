pub mod config;
pub mod errors;
pub mod formatter;
pub mod locator;
pub mod models;
pub mod notes;
pub mod period;
pub mod sections;
pub mod store;
pub mod upsert;

pub use crate::config::EngineConfig;
pub use crate::errors::{AppError, AppResult};
pub use crate::notes::NoteEngine;
pub use crate::store::{DocumentStore, MemoryStore, VaultStore};

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(log_dir: Option<&Path>) -> AppResult<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = tracing_appender::rolling::daily(log_dir, "periodic-notes.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = LOG_GUARD.set(guard);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_writer(non_blocking)
                .try_init()
                .map_err(|error| AppError::Internal(error.to_string()))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| AppError::Internal(error.to_string())),
    }
}
