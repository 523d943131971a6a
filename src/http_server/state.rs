//! Shared handler state

use crate::storage::StorageHandle;

/// State injected into every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub storage: StorageHandle,
    /// Answer 404 instead of the success envelope when an update matches nothing
    pub reject_unmatched_updates: bool,
}

impl AppState {
    pub fn new(storage: StorageHandle) -> Self {
        Self {
            storage,
            reject_unmatched_updates: false,
        }
    }

    pub fn with_reject_unmatched_updates(mut self, reject: bool) -> Self {
        self.reject_unmatched_updates = reject;
        self
    }
}
