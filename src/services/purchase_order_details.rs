use crate::{
    db::DbPool,
    entities::{
        purchase_order,
        purchase_order_detail::{self, ActiveModel as DetailActiveModel, Entity as DetailEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{
        amount::{check_line_amount, deserialize_lenient, deserialize_lenient_opt, LINE_SCALE},
        AmountError, FieldMode, LineItem,
    },
    services::purchase_orders::{find_order, refresh_totals, require_actor},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

/// A line item as submitted by a client.
///
/// Numeric inputs are read leniently: numbers or numeric strings, anything
/// else counts as zero. `total_price`, `vds` and `tds` are manual overrides
/// when present and derived when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetailInput {
    /// Existing detail id; absent for new lines.
    pub id: Option<i32>,
    pub line_no: Option<i32>,
    pub inv_product_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    #[schema(value_type = String, example = "3")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    #[schema(value_type = String, example = "12.50")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    #[schema(value_type = String, example = "2.50")]
    pub discount: Decimal,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    #[schema(value_type = String, example = "5")]
    pub vds_pct: Decimal,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    #[schema(value_type = String, example = "2")]
    pub tds_pct: Decimal,
    /// Used only when the gross amount is zero.
    #[serde(default, deserialize_with = "deserialize_lenient_opt")]
    #[schema(value_type = Option<String>)]
    pub discount_pct: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_opt")]
    #[schema(value_type = Option<String>)]
    pub total_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_opt")]
    #[schema(value_type = Option<String>)]
    pub vds: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_lenient_opt")]
    #[schema(value_type = Option<String>)]
    pub tds: Option<Decimal>,
}

impl DetailInput {
    /// Rejects inputs that would make an auto-derived amount negative or
    /// that a line column could not store exactly.
    pub fn validate_amounts(&self, position: usize) -> Result<(), ServiceError> {
        let invalid = |reason: String| {
            ServiceError::ValidationError(format!("Line {}: {}", position + 1, reason))
        };

        let inputs = [
            ("quantity", self.quantity),
            ("unit_price", self.unit_price),
            ("discount", self.discount),
            ("vds_pct", self.vds_pct),
            ("tds_pct", self.tds_pct),
        ];
        for (name, value) in inputs {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(invalid(format!("{} must not be negative", name)));
            }
        }

        let overrides = [
            ("discount_pct", self.discount_pct),
            ("total_price", self.total_price),
            ("vds", self.vds),
            ("tds", self.tds),
        ];
        let supplied = overrides
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name, value)));
        for (name, value) in inputs.into_iter().chain(supplied) {
            check_line_amount(name, value).map_err(|e| invalid(e.to_string()))?;
        }

        let item = self.to_line_item().map_err(|e| invalid(e.to_string()))?;
        let gross = item.gross().map_err(|e| invalid(e.to_string()))?;
        if self.discount > gross {
            return Err(invalid("discount exceeds quantity * unit_price".to_string()));
        }
        for (name, value) in [
            ("quantity * unit_price", gross),
            ("total_price", item.total_price),
            ("vds", item.vds),
            ("tds", item.tds),
        ] {
            check_line_amount(name, value).map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Runs the calculator over this input.
    pub fn to_line_item(&self) -> Result<LineItem, AmountError> {
        let mut item = LineItem {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            vds_pct: self.vds_pct,
            tds_pct: self.tds_pct,
            discount_pct: self.discount_pct.unwrap_or_default(),
            ..Default::default()
        };
        if let Some(value) = self.total_price {
            item.total_price = value;
            item.total_price_mode = FieldMode::Manual;
        }
        if let Some(value) = self.vds {
            item.vds = value;
            item.vds_mode = FieldMode::Manual;
        }
        if let Some(value) = self.tds {
            item.tds = value;
            item.tds_mode = FieldMode::Manual;
        }
        item.recalculate()?;
        Ok(item)
    }

    pub(crate) fn new_active_model(
        &self,
        po_id: i32,
        now: DateTime<Utc>,
    ) -> Result<DetailActiveModel, ServiceError> {
        let item = self.to_line_item()?;
        Ok(DetailActiveModel {
            po_id: Set(po_id),
            line_no: Set(self.line_no),
            inv_product_id: Set(self.inv_product_id),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            discount: Set(item.discount),
            discount_pct: Set(item.discount_pct),
            total_price: Set(item.total_price),
            vds_pct: Set(item.vds_pct),
            vds: Set(item.vds),
            tds_pct: Set(item.tds_pct),
            tds: Set(item.tds),
            created: Set(now),
            modified: Set(now),
            ..Default::default()
        })
    }

    /// Active model that rewrites `stored` with this input, or `None` when
    /// nothing would change.
    pub(crate) fn changes_to(
        &self,
        stored: &purchase_order_detail::Model,
        now: DateTime<Utc>,
    ) -> Result<Option<DetailActiveModel>, ServiceError> {
        let item = self.to_line_item()?;
        let unchanged = stored.line_no == self.line_no
            && stored.inv_product_id == self.inv_product_id
            && same(stored.quantity, item.quantity)
            && same(stored.unit_price, item.unit_price)
            && same(stored.discount, item.discount)
            && same(stored.discount_pct, item.discount_pct)
            && same(stored.total_price, item.total_price)
            && same(stored.vds_pct, item.vds_pct)
            && same(stored.vds, item.vds)
            && same(stored.tds_pct, item.tds_pct)
            && same(stored.tds, item.tds);
        if unchanged {
            return Ok(None);
        }

        let mut active: DetailActiveModel = stored.clone().into();
        active.line_no = Set(self.line_no);
        active.inv_product_id = Set(self.inv_product_id);
        active.quantity = Set(item.quantity);
        active.unit_price = Set(item.unit_price);
        active.discount = Set(item.discount);
        active.discount_pct = Set(item.discount_pct);
        active.total_price = Set(item.total_price);
        active.vds_pct = Set(item.vds_pct);
        active.vds = Set(item.vds);
        active.tds_pct = Set(item.tds_pct);
        active.tds = Set(item.tds);
        active.modified = Set(now);
        Ok(Some(active))
    }
}

// Every line column holds LINE_SCALE places; SQLite hands them back as floats.
fn same(a: Decimal, b: Decimal) -> bool {
    a.round_dp(LINE_SCALE) == b.round_dp(LINE_SCALE)
}

pub(crate) async fn details_of<C: ConnectionTrait>(
    conn: &C,
    po_id: i32,
) -> Result<Vec<purchase_order_detail::Model>, ServiceError> {
    let details = DetailEntity::find()
        .filter(purchase_order_detail::Column::PoId.eq(po_id))
        .order_by_asc(purchase_order_detail::Column::LineNo)
        .order_by_asc(purchase_order_detail::Column::Id)
        .all(conn)
        .await?;
    Ok(details)
}

async fn find_detail<C: ConnectionTrait>(
    conn: &C,
    po_id: i32,
    detail_id: i32,
) -> Result<purchase_order_detail::Model, ServiceError> {
    DetailEntity::find_by_id(detail_id)
        .filter(purchase_order_detail::Column::PoId.eq(po_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Purchase order detail {} not found on order {}",
                detail_id, po_id
            ))
        })
}

/// Line-item operations scoped to one order. Each mutation refreshes the
/// order totals in the same transaction.
#[derive(Clone)]
pub struct PurchaseOrderDetailService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PurchaseOrderDetailService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, po_id: i32) -> Result<Vec<purchase_order_detail::Model>, ServiceError> {
        let db = &*self.db_pool;
        find_order(db, po_id).await?;
        details_of(db, po_id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        po_id: i32,
        input: DetailInput,
        actor: Option<&str>,
    ) -> Result<purchase_order_detail::Model, ServiceError> {
        let actor = require_actor(actor)?;
        input.validate_amounts(0)?;

        let txn = self.db_pool.begin().await?;
        let order = find_order(&txn, po_id).await?;
        let detail = input
            .new_active_model(order.id, Utc::now())?
            .insert(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, po_id, "Failed to insert purchase order detail");
                ServiceError::from(e)
            })?;
        let order = refresh_totals(&txn, order, actor).await?;
        txn.commit().await?;

        info!(po_id, detail_id = detail.id, "Purchase order detail created");
        self.notify(&order).await;
        Ok(detail)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        po_id: i32,
        detail_id: i32,
        input: DetailInput,
        actor: Option<&str>,
    ) -> Result<purchase_order_detail::Model, ServiceError> {
        let actor = require_actor(actor)?;
        input.validate_amounts(0)?;

        let txn = self.db_pool.begin().await?;
        let order = find_order(&txn, po_id).await?;
        let stored = find_detail(&txn, po_id, detail_id).await?;
        let detail = match input.changes_to(&stored, Utc::now())? {
            Some(active) => active.update(&txn).await?,
            None => stored,
        };
        let order = refresh_totals(&txn, order, actor).await?;
        txn.commit().await?;

        info!(po_id, detail_id, "Purchase order detail updated");
        self.notify(&order).await;
        Ok(detail)
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        po_id: i32,
        detail_id: i32,
        actor: Option<&str>,
    ) -> Result<(), ServiceError> {
        let actor = require_actor(actor)?;

        let txn = self.db_pool.begin().await?;
        let order = find_order(&txn, po_id).await?;
        find_detail(&txn, po_id, detail_id).await?;
        DetailEntity::delete_by_id(detail_id).exec(&txn).await?;
        let order = refresh_totals(&txn, order, actor).await?;
        txn.commit().await?;

        info!(po_id, detail_id, "Purchase order detail deleted");
        self.notify(&order).await;
        Ok(())
    }

    async fn notify(&self, order: &purchase_order::Model) {
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::DetailsChanged {
                    po_id: order.id,
                    grand_total: order.grand_total,
                })
                .await;
        }
    }
}
