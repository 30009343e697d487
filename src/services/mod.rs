// Purchase order lifecycle
pub mod purchase_orders;

// Line items scoped to an order
pub mod purchase_order_details;

pub use purchase_order_details::{DetailInput, PurchaseOrderDetailService};
pub use purchase_orders::{
    CreatePurchaseOrderRequest, ExportRow, Page, PurchaseOrderService, PurchaseOrderSettings,
    PurchaseOrderWithDetails, UpdatePurchaseOrderRequest,
};
