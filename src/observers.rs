use std::sync::{Arc, Mutex, PoisonError};

use crate::events::CatalogEvent;

/// Trait for catalog notification observation
pub trait CatalogObserver: Send + Sync {
    /// Called once for every notification the catalog raises
    fn on_event(&self, event: &CatalogEvent);
}

/// Forwards every notification to `tracing`: rejections as warnings,
/// confirmations as info
#[derive(Debug, Default)]
pub struct TracingObserver;

impl CatalogObserver for TracingObserver {
    fn on_event(&self, event: &CatalogEvent) {
        if event.is_rejection() {
            tracing::warn!(%event, "catalog call ignored");
        } else {
            tracing::info!(%event, "catalog updated");
        }
    }
}

/// Collects the rendered notifications so a front end can show them later
#[derive(Debug, Clone, Default)]
pub struct NotificationService {
    /// Messages received so far, shared between clones
    messages: Arc<Mutex<Vec<String>>>,
}

impl NotificationService {
    /// Create an empty inbox
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all messages received since the last drain
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl CatalogObserver for NotificationService {
    fn on_event(&self, event: &CatalogEvent) {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).push(event.to_string());
    }
}
