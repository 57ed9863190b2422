//! Shared application state for the API server.

use std::sync::Arc;

use pitwall_stats::Dataset;

/// State shared by every handler.
///
/// Holds nothing but the dataset handle; each request acquires its own
/// session from it, so handlers never contend on shared state.
#[derive(Clone)]
pub struct AppState {
    /// The dataset queries run against.
    pub dataset: Arc<dyn Dataset>,
}

impl AppState {
    /// Wrap a dataset for sharing across handlers.
    pub fn new(dataset: impl Dataset + 'static) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    /// Borrow the dataset as a trait object.
    pub fn dataset(&self) -> &dyn Dataset {
        self.dataset.as_ref()
    }
}
