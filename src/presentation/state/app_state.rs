use std::sync::Arc;

use crate::application::ports::TranscriptionEngine;
use crate::presentation::config::Settings;

/// Shared handler state. The engine is constructed once at startup and
/// never mutated afterwards, so handlers share it read-only.
pub struct AppState<E>
where
    E: TranscriptionEngine,
{
    pub engine: Arc<E>,
    pub settings: Settings,
}

impl<E> Clone for AppState<E>
where
    E: TranscriptionEngine,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            settings: self.settings.clone(),
        }
    }
}
