use std::{path::PathBuf, sync::Arc};

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::views::Views;

/// The shared application state.
///
/// Cloned into every handler by axum. The pool replaces any global database handle:
/// handlers open their own transaction from it.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Compiled page templates.
    pub views: Arc<Views>,
    /// Activity counters.
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            config: Arc::new(config),
            views: Arc::new(Views::new()?),
            metrics: Metrics::new(),
        })
    }

    pub fn uploads_root(&self) -> PathBuf {
        PathBuf::from(&self.config.uploads.root)
    }
}
