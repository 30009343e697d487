pub mod auth;
pub mod common;
pub mod details;
pub mod health;
pub mod purchase_orders;

use crate::events::EventSender;
use crate::services::{PurchaseOrderDetailService, PurchaseOrderService, PurchaseOrderSettings};
use crate::db::DbPool;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub details: Arc<PurchaseOrderDetailService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        settings: PurchaseOrderSettings,
    ) -> Self {
        let purchase_orders = Arc::new(PurchaseOrderService::new(
            db_pool.clone(),
            event_sender.clone(),
            settings,
        ));
        let details = Arc::new(PurchaseOrderDetailService::new(db_pool, event_sender));

        Self {
            purchase_orders,
            details,
        }
    }
}
