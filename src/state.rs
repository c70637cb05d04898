use std::sync::Arc;

use crate::services::TrackerService;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub tracker: TrackerService,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            tracker: TrackerService::new(store),
        }
    }
}
