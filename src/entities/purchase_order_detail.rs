use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "purchase_order_details")]
#[schema(as = PurchaseOrderDetail)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub po_id: i32,
    pub line_no: Option<i32>,
    pub inv_product_id: Option<i32>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub discount_pct: Decimal,
    pub total_price: Decimal,
    pub vds_pct: Decimal,
    pub vds: Decimal,
    pub tds_pct: Decimal,
    pub tds: Decimal,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_order::Entity",
        from = "Column::PoId",
        to = "super::purchase_order::Column::Id"
    )]
    PurchaseOrder,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
