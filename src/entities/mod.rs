pub mod purchase_order;
pub mod purchase_order_detail;
pub mod user;
