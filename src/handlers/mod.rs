pub mod analytics;
pub mod common;
pub mod reports;
pub mod supplies;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub supplies: Arc<crate::services::supplies::SupplyService>,
    pub analytics: Arc<crate::services::analytics::AnalyticsService>,
    pub reports: Arc<crate::services::reports::ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let supplies = Arc::new(crate::services::supplies::SupplyService::new(
            db_pool.clone(),
            event_sender,
        ));
        let analytics = Arc::new(crate::services::analytics::AnalyticsService::new(
            db_pool.clone(),
        ));
        let reports = Arc::new(crate::services::reports::ReportService::new(db_pool));

        Self {
            supplies,
            analytics,
            reports,
        }
    }
}
