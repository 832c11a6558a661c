use std::sync::Arc;

use storage::repository::Storage;

use crate::dashboard_service::DashboardService;
use crate::dispatcher::BackgroundDispatcher;
use crate::error::AppServicesError;
use crate::generation::{GeminiGateway, GenerationGateway};

/// Assembles the dispatcher and dashboard over one store.
#[derive(Clone)]
pub struct AppServices {
    dispatcher: Arc<BackgroundDispatcher>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the configured Gemini endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, Arc::new(GeminiGateway::from_env())))
    }

    #[must_use]
    pub fn with_storage(storage: Storage, generation: Arc<dyn GenerationGateway>) -> Self {
        let dispatcher = Arc::new(BackgroundDispatcher::new(
            Arc::clone(&storage.store),
            generation,
        ));
        let dashboard = Arc::new(DashboardService::new(Arc::clone(&storage.store)));
        Self {
            dispatcher,
            dashboard,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> Arc<BackgroundDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
