//! Application state management

use crate::inference::Predictor;

/// Application state shared across handlers.
///
/// Loaded once at start-up and never mutated, so handlers share it through
/// an `Arc` without locking.
pub struct AppState {
    pub predictor: Predictor,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor,
            started_at: chrono::Utc::now(),
        }
    }
}
