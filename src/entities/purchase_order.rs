use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "purchase_orders")]
#[schema(as = PurchaseOrder)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub po_no: String,
    /// Parent order id. Root orders carry their own id or null.
    pub po_id: Option<i32>,
    pub po_date: Option<NaiveDate>,
    pub po_type: Option<String>,
    pub pay_mode: Option<String>,
    pub currency: Option<String>,
    pub subject: Option<String>,
    pub remarks: Option<String>,
    pub company_code: Option<String>,
    pub vendor_id: Option<i32>,
    pub store_id: Option<i32>,
    pub discount: Decimal,
    pub sub_total: Decimal,
    pub grand_total: Decimal,
    pub vds_total: Decimal,
    pub tds_total: Decimal,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_detail::Entity")]
    Details,
}

impl Related<super::purchase_order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A root order has no parent, or points at itself.
    pub fn is_root(&self) -> bool {
        self.po_id.map_or(true, |parent| parent == self.id)
    }
}
