//! Shared application state for all routes.

use crate::config::Settings;
use crate::store::ItemStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub settings: Arc<Settings>,
    /// Uptime reported by `/health` counts from here.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, settings: Settings) -> Self {
        AppState {
            store,
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
