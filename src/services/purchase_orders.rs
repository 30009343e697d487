use crate::{
    config::AppConfig,
    db::{DatabaseAccess, DbPool},
    entities::{
        purchase_order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
        purchase_order_detail::{self, Entity as DetailEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    numbering,
    pricing::{aggregate, OrderTotals},
    services::purchase_order_details::{details_of, DetailInput},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait, Value,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

const NUMBER_SCAN_PAGE_SIZE: u64 = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    /// Parent order id for child orders.
    pub po_id: Option<i32>,
    #[validate(required)]
    pub po_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub po_type: Option<String>,
    #[validate(length(max = 50))]
    pub pay_mode: Option<String>,
    #[validate(length(max = 10))]
    pub currency: Option<String>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    pub remarks: Option<String>,
    #[validate(length(max = 50))]
    pub company_code: Option<String>,
    #[validate(required)]
    pub vendor_id: Option<i32>,
    #[validate(required)]
    pub store_id: Option<i32>,
    #[serde(default)]
    pub details: Vec<DetailInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    #[validate(length(min = 1, max = 32, message = "po_no is required"))]
    pub po_no: String,
    /// New parent id. Omitted keeps the current parent; `null` makes the
    /// order a root again.
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<i32>)]
    pub po_id: Option<Option<i32>>,
    #[validate(required)]
    pub po_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub po_type: Option<String>,
    #[validate(length(max = 50))]
    pub pay_mode: Option<String>,
    #[validate(length(max = 10))]
    pub currency: Option<String>,
    #[validate(length(max = 255))]
    pub subject: Option<String>,
    pub remarks: Option<String>,
    #[validate(length(max = 50))]
    pub company_code: Option<String>,
    #[validate(required)]
    pub vendor_id: Option<i32>,
    #[validate(required)]
    pub store_id: Option<i32>,
    /// Full line list. Omitted leaves the stored lines alone.
    pub details: Option<Vec<DetailInput>>,
}

// Distinguishes an explicit `null` (`Some(None)`) from a missing field (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An order with its lines.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseOrderWithDetails {
    #[serde(flatten)]
    pub order: purchase_order::Model,
    /// `po_no` of the parent order, when there is one.
    pub parent_po_no: Option<String>,
    pub details: Vec<purchase_order_detail::Model>,
}

/// One flattened export row: an order joined with one of its lines, or the
/// order alone when it has none.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExportRow {
    pub order_id: i32,
    pub po_no: String,
    pub parent_po_no: Option<String>,
    pub po_date: Option<NaiveDate>,
    pub po_type: Option<String>,
    pub pay_mode: Option<String>,
    pub currency: Option<String>,
    pub subject: Option<String>,
    pub company_code: Option<String>,
    pub vendor_id: Option<i32>,
    pub store_id: Option<i32>,
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
    pub vds_total: Decimal,
    pub tds_total: Decimal,
    pub detail_id: Option<i32>,
    pub line_no: Option<i32>,
    pub inv_product_id: Option<i32>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub line_discount: Option<Decimal>,
    pub discount_pct: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub vds_pct: Option<Decimal>,
    pub vds: Option<Decimal>,
    pub tds_pct: Option<Decimal>,
    pub tds: Option<Decimal>,
}

impl ExportRow {
    fn new(
        order: &purchase_order::Model,
        parent_po_no: Option<String>,
        detail: Option<&purchase_order_detail::Model>,
    ) -> Self {
        Self {
            order_id: order.id,
            po_no: order.po_no.clone(),
            parent_po_no,
            po_date: order.po_date,
            po_type: order.po_type.clone(),
            pay_mode: order.pay_mode.clone(),
            currency: order.currency.clone(),
            subject: order.subject.clone(),
            company_code: order.company_code.clone(),
            vendor_id: order.vendor_id,
            store_id: order.store_id,
            sub_total: order.sub_total,
            discount: order.discount,
            grand_total: order.grand_total,
            vds_total: order.vds_total,
            tds_total: order.tds_total,
            detail_id: detail.map(|d| d.id),
            line_no: detail.and_then(|d| d.line_no),
            inv_product_id: detail.and_then(|d| d.inv_product_id),
            quantity: detail.map(|d| d.quantity),
            unit_price: detail.map(|d| d.unit_price),
            line_discount: detail.map(|d| d.discount),
            discount_pct: detail.map(|d| d.discount_pct),
            total_price: detail.map(|d| d.total_price),
            vds_pct: detail.map(|d| d.vds_pct),
            vds: detail.map(|d| d.vds),
            tds_pct: detail.map(|d| d.tds_pct),
            tds: detail.map(|d| d.tds),
        }
    }
}

/// One page of results plus the numbers needed to build a pagination envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone)]
pub struct PurchaseOrderSettings {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Store `po_id = id` on new root orders instead of null.
    pub root_self_reference: bool,
}

impl Default for PurchaseOrderSettings {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 1000,
            root_self_reference: true,
        }
    }
}

impl From<&AppConfig> for PurchaseOrderSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            default_page_size: cfg.api_default_page_size,
            max_page_size: cfg.api_max_page_size,
            root_self_reference: cfg.po_root_self_reference,
        }
    }
}

impl PurchaseOrderSettings {
    fn page_window(&self, page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
        let page = page.unwrap_or(1).max(1);
        let limit = match limit {
            Some(0) | None => self.default_page_size,
            Some(limit) => limit,
        }
        .clamp(1, self.max_page_size.max(1));
        (page, limit)
    }
}

pub(crate) fn require_actor(actor: Option<&str>) -> Result<&str, ServiceError> {
    match actor.map(str::trim) {
        Some(actor) if !actor.is_empty() => Ok(actor),
        _ => Err(ServiceError::Unauthorized(
            "An authenticated user is required".to_string(),
        )),
    }
}

pub(crate) async fn find_order<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<purchase_order::Model, ServiceError> {
    OrderEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", id)))
}

/// Recomputes the order totals from its stored lines and saves them.
pub(crate) async fn refresh_totals<C: ConnectionTrait>(
    conn: &C,
    order: purchase_order::Model,
    actor: &str,
) -> Result<purchase_order::Model, ServiceError> {
    let details = details_of(conn, order.id).await?;
    let totals = aggregate(&details)?;

    let mut active: OrderActiveModel = order.into();
    set_totals(&mut active, &totals);
    active.modified_by = Set(Some(actor.to_string()));
    active.modified = Set(Utc::now());
    Ok(active.update(conn).await?)
}

fn set_totals(active: &mut OrderActiveModel, totals: &OrderTotals) {
    active.sub_total = Set(totals.sub_total);
    active.discount = Set(totals.discount);
    active.grand_total = Set(totals.grand_total);
    active.vds_total = Set(totals.vds_total);
    active.tds_total = Set(totals.tds_total);
}

/// Reads every `po_no` page by page and derives the next number.
async fn scan_next_number<C: ConnectionTrait>(conn: &C) -> Result<String, ServiceError> {
    let mut pages = OrderEntity::find()
        .select_only()
        .column(purchase_order::Column::PoNo)
        .order_by_asc(purchase_order::Column::Id)
        .into_tuple::<String>()
        .paginate(conn, NUMBER_SCAN_PAGE_SIZE);

    let mut numbers = Vec::new();
    while let Some(page) = pages.fetch_and_next().await? {
        numbers.extend(page);
    }
    Ok(numbering::next_po_number(&numbers))
}

async fn ensure_parent_exists<C: ConnectionTrait>(conn: &C, parent: i32) -> Result<(), ServiceError> {
    let count = OrderEntity::find_by_id(parent).count(conn).await?;
    if count == 0 {
        return Err(ServiceError::NotFound(format!(
            "Parent purchase order {} not found",
            parent
        )));
    }
    Ok(())
}

fn newest_first(select: Select<OrderEntity>) -> Select<OrderEntity> {
    select
        .order_by_desc(purchase_order::Column::Created)
        .order_by_desc(purchase_order::Column::Id)
}

/// `LIKE` pattern matching `query` literally anywhere in the value.
fn contains_pattern(query: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

fn search_condition(query: &str) -> Condition {
    let pattern = contains_pattern(query);
    [
        purchase_order::Column::PoNo,
        purchase_order::Column::PoType,
        purchase_order::Column::PayMode,
        purchase_order::Column::CompanyCode,
    ]
    .into_iter()
    .fold(Condition::any(), |cond, column| {
        cond.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone()))
    })
}

/// Orchestrates purchase order create, update, delete and the read paths.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    settings: PurchaseOrderSettings,
}

impl PurchaseOrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        settings: PurchaseOrderSettings,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            settings,
        }
    }

    /// Creates an order and its lines, assigning the next `po_no`.
    ///
    /// Totals are aggregated from the lines as stored. A unique-index clash
    /// on `po_no` from a concurrent create surfaces as `Conflict`.
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreatePurchaseOrderRequest,
        actor: Option<&str>,
    ) -> Result<PurchaseOrderWithDetails, ServiceError> {
        let actor = require_actor(actor)?;
        request.validate()?;
        for (position, line) in request.details.iter().enumerate() {
            line.validate_amounts(position)?;
        }

        let lines = request
            .details
            .iter()
            .map(DetailInput::to_line_item)
            .collect::<Result<Vec<_>, _>>()?;
        aggregate(&lines)?;
        let now = Utc::now();

        let txn = self.db_pool.begin().await?;
        if let Some(parent) = request.po_id {
            ensure_parent_exists(&txn, parent).await?;
        }
        let po_no = scan_next_number(&txn).await?;

        let mut active = OrderActiveModel {
            po_no: Set(po_no.clone()),
            po_id: Set(request.po_id),
            po_date: Set(request.po_date),
            po_type: Set(request.po_type),
            pay_mode: Set(request.pay_mode),
            currency: Set(request.currency),
            subject: Set(request.subject),
            remarks: Set(request.remarks),
            company_code: Set(request.company_code),
            vendor_id: Set(request.vendor_id),
            store_id: Set(request.store_id),
            created_by: Set(Some(actor.to_string())),
            modified_by: Set(Some(actor.to_string())),
            created: Set(now),
            modified: Set(now),
            ..Default::default()
        };
        set_totals(&mut active, &OrderTotals::default());

        let order = active.insert(&txn).await.map_err(|e| {
            error!(error = %e, %po_no, "Failed to insert purchase order");
            ServiceError::from(e)
        })?;

        let mut details = Vec::with_capacity(request.details.len());
        for line in &request.details {
            details.push(line.new_active_model(order.id, now)?.insert(&txn).await?);
        }
        let totals = aggregate(&details)?;

        let own_id = order.id;
        let self_reference = order.po_id.is_none() && self.settings.root_self_reference;
        let mut active: OrderActiveModel = order.into();
        if self_reference {
            active.po_id = Set(Some(own_id));
        }
        set_totals(&mut active, &totals);
        let order = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %po_no, "Failed to commit purchase order creation");
            ServiceError::from(e)
        })?;

        info!(po_id = order.id, %po_no, lines = details.len(), "Purchase order created");
        self.emit(Event::PurchaseOrderCreated {
            id: order.id,
            po_no: order.po_no.clone(),
            grand_total: order.grand_total,
        })
        .await;

        let parent_po_no = self.parent_po_no(&order).await;
        Ok(PurchaseOrderWithDetails {
            order,
            parent_po_no,
            details,
        })
    }

    /// Rewrites an order header and, when lines are supplied, diffs them
    /// against the stored lines. Everything happens in one transaction.
    #[instrument(skip(self, request), fields(po_no = %request.po_no))]
    pub async fn update(
        &self,
        id: i32,
        request: UpdatePurchaseOrderRequest,
        actor: Option<&str>,
    ) -> Result<PurchaseOrderWithDetails, ServiceError> {
        let actor = require_actor(actor)?;
        request.validate()?;
        if let Some(lines) = &request.details {
            for (position, line) in lines.iter().enumerate() {
                line.validate_amounts(position)?;
            }
        }
        let po_no = request.po_no.trim().to_string();

        let txn = self.db_pool.begin().await?;
        let existing = find_order(&txn, id).await?;

        let taken = OrderEntity::find()
            .filter(purchase_order::Column::PoNo.eq(po_no.as_str()))
            .filter(purchase_order::Column::Id.ne(id))
            .count(&txn)
            .await?;
        if taken > 0 {
            warn!(po_id = id, %po_no, "Rejected duplicate purchase order number");
            return Err(ServiceError::Conflict(format!(
                "Purchase order number {} is already in use",
                po_no
            )));
        }

        let parent = match request.po_id {
            None => existing.po_id,
            Some(None) if self.settings.root_self_reference => Some(id),
            Some(parent) => parent,
        };
        if let Some(parent) = parent.filter(|parent| *parent != id) {
            ensure_parent_exists(&txn, parent).await?;
        }

        let now = Utc::now();
        if let Some(lines) = &request.details {
            self.sync_details(&txn, id, lines, now).await?;
        }

        let details = details_of(&txn, id).await?;
        let totals = aggregate(&details)?;

        let mut active: OrderActiveModel = existing.into();
        active.po_no = Set(po_no);
        active.po_id = Set(parent);
        active.po_date = Set(request.po_date);
        active.po_type = Set(request.po_type);
        active.pay_mode = Set(request.pay_mode);
        active.currency = Set(request.currency);
        active.subject = Set(request.subject);
        active.remarks = Set(request.remarks);
        active.company_code = Set(request.company_code);
        active.vendor_id = Set(request.vendor_id);
        active.store_id = Set(request.store_id);
        active.modified_by = Set(Some(actor.to_string()));
        active.modified = Set(now);
        set_totals(&mut active, &totals);
        let order = active.update(&txn).await?;

        txn.commit().await?;

        info!(po_id = id, "Purchase order updated");
        self.emit(Event::PurchaseOrderUpdated {
            id: order.id,
            po_no: order.po_no.clone(),
            grand_total: order.grand_total,
        })
        .await;

        let parent_po_no = self.parent_po_no(&order).await;
        Ok(PurchaseOrderWithDetails {
            order,
            parent_po_no,
            details,
        })
    }

    async fn sync_details<C: ConnectionTrait>(
        &self,
        conn: &C,
        po_id: i32,
        lines: &[DetailInput],
        now: chrono::DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let stored: HashMap<i32, purchase_order_detail::Model> = details_of(conn, po_id)
            .await?
            .into_iter()
            .map(|detail| (detail.id, detail))
            .collect();

        let mut kept = HashSet::new();
        for line in lines {
            match line.id {
                Some(detail_id) => {
                    let current = stored.get(&detail_id).ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Purchase order detail {} not found on order {}",
                            detail_id, po_id
                        ))
                    })?;
                    kept.insert(detail_id);
                    if let Some(active) = line.changes_to(current, now)? {
                        active.update(conn).await?;
                    }
                }
                None => {
                    line.new_active_model(po_id, now)?.insert(conn).await?;
                }
            }
        }

        for detail_id in stored.keys().filter(|id| !kept.contains(id)) {
            DetailEntity::delete_by_id(*detail_id).exec(conn).await?;
        }
        Ok(())
    }

    /// Deletes an order and its lines, detaching child orders.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let (po_no, detached, removed_lines) = DatabaseAccess::new(self.db_pool.clone())
            .transaction(|txn| {
                Box::pin(async move {
                    let order = find_order(txn, id).await?;

                    let detached = OrderEntity::update_many()
                        .col_expr(purchase_order::Column::PoId, Expr::value(Value::Int(None)))
                        .filter(purchase_order::Column::PoId.eq(id))
                        .filter(purchase_order::Column::Id.ne(id))
                        .exec(txn)
                        .await?
                        .rows_affected;

                    let removed_lines = DetailEntity::delete_many()
                        .filter(purchase_order_detail::Column::PoId.eq(id))
                        .exec(txn)
                        .await?
                        .rows_affected;

                    OrderEntity::delete_by_id(id).exec(txn).await?;
                    Ok::<_, ServiceError>((order.po_no, detached, removed_lines))
                })
            })
            .await
            .map_err(|e| {
                if !matches!(e, ServiceError::NotFound(_)) {
                    error!(error = %e, po_id = id, "Purchase order deletion rolled back");
                }
                e
            })?;

        info!(po_id = id, removed_lines, detached, "Purchase order deleted");
        self.emit(Event::PurchaseOrderDeleted {
            id,
            po_no,
            detached_children: detached,
        })
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<PurchaseOrderWithDetails, ServiceError> {
        let db = &*self.db_pool;
        let order = find_order(db, id).await?;
        let details = details_of(db, id).await?;
        let parent_po_no = self.parent_po_no(&order).await;
        Ok(PurchaseOrderWithDetails {
            order,
            parent_po_no,
            details,
        })
    }

    /// Orders newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<purchase_order::Model>, ServiceError> {
        self.fetch_page(newest_first(OrderEntity::find()), page, limit)
            .await
    }

    /// Case-insensitive substring match over number, type, pay mode and
    /// company code. A blank query lists everything.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<purchase_order::Model>, ServiceError> {
        if query.trim().is_empty() {
            return self.list(page, limit).await;
        }
        let select = newest_first(OrderEntity::find().filter(search_condition(query)));
        self.fetch_page(select, page, limit).await
    }

    async fn fetch_page(
        &self,
        select: Select<OrderEntity>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Page<purchase_order::Model>, ServiceError> {
        let db = &*self.db_pool;
        let (page, page_size) = self.settings.page_window(page, limit);

        let paginator = select.paginate(db, page_size);
        let counts = paginator.num_items_and_pages().await.map_err(|e| {
            error!(error = %e, "Failed to count purchase orders");
            ServiceError::from(e)
        })?;
        let items = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(error = %e, page, page_size, "Failed to fetch purchase orders page");
            ServiceError::from(e)
        })?;

        Ok(Page {
            items,
            total_items: counts.number_of_items,
            page,
            page_size,
            total_pages: counts.number_of_pages,
        })
    }

    /// Orders whose parent is `id`, oldest first.
    #[instrument(skip(self))]
    pub async fn children(&self, id: i32) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let db = &*self.db_pool;
        find_order(db, id).await?;
        let children = OrderEntity::find()
            .filter(purchase_order::Column::PoId.eq(id))
            .filter(purchase_order::Column::Id.ne(id))
            .order_by_asc(purchase_order::Column::Created)
            .order_by_asc(purchase_order::Column::Id)
            .all(db)
            .await?;
        Ok(children)
    }

    /// The number the next create would assign.
    #[instrument(skip(self))]
    pub async fn next_po_number(&self) -> Result<String, ServiceError> {
        scan_next_number(&*self.db_pool).await
    }

    /// Every order flattened to one row per line, newest order first.
    #[instrument(skip(self))]
    pub async fn export_rows(&self) -> Result<Vec<ExportRow>, ServiceError> {
        let db = &*self.db_pool;
        let orders = newest_first(OrderEntity::find())
            .find_with_related(DetailEntity)
            .all(db)
            .await?;

        let numbers: HashMap<i32, String> = orders
            .iter()
            .map(|(order, _)| (order.id, order.po_no.clone()))
            .collect();

        let mut rows = Vec::new();
        for (order, mut details) in orders {
            let parent_po_no = order
                .po_id
                .filter(|parent| *parent != order.id)
                .and_then(|parent| numbers.get(&parent).cloned());

            if details.is_empty() {
                rows.push(ExportRow::new(&order, parent_po_no, None));
                continue;
            }
            details.sort_by_key(|d| (d.line_no, d.id));
            for detail in &details {
                rows.push(ExportRow::new(&order, parent_po_no.clone(), Some(detail)));
            }
        }
        Ok(rows)
    }

    // Lookup failures degrade to no parent number.
    async fn parent_po_no(&self, order: &purchase_order::Model) -> Option<String> {
        if order.is_root() {
            return None;
        }
        let parent = order.po_id?;
        match OrderEntity::find_by_id(parent).one(&*self.db_pool).await {
            Ok(found) => found.map(|p| p.po_no),
            Err(e) => {
                warn!(error = %e, po_id = order.id, parent, "Parent order lookup failed");
                None
            }
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn page_window_applies_defaults_and_clamps() {
        let settings = PurchaseOrderSettings {
            default_page_size: 25,
            max_page_size: 100,
            root_self_reference: true,
        };
        assert_eq!(settings.page_window(None, None), (1, 25));
        assert_eq!(settings.page_window(Some(0), Some(0)), (1, 25));
        assert_eq!(settings.page_window(Some(3), Some(10)), (3, 10));
        assert_eq!(settings.page_window(Some(2), Some(5000)), (2, 100));
    }

    #[test]
    fn actor_must_be_present() {
        assert_matches!(require_actor(None), Err(ServiceError::Unauthorized(_)));
        assert_matches!(require_actor(Some("  ")), Err(ServiceError::Unauthorized(_)));
        assert_eq!(require_actor(Some("7")).unwrap(), "7");
    }

    #[test]
    fn update_parent_distinguishes_null_from_missing() {
        let missing: UpdatePurchaseOrderRequest =
            serde_json::from_value(serde_json::json!({"po_no": "PO2"})).unwrap();
        assert_eq!(missing.po_id, None);

        let cleared: UpdatePurchaseOrderRequest =
            serde_json::from_value(serde_json::json!({"po_no": "PO2", "po_id": null})).unwrap();
        assert_eq!(cleared.po_id, Some(None));

        let moved: UpdatePurchaseOrderRequest =
            serde_json::from_value(serde_json::json!({"po_no": "PO2", "po_id": 4})).unwrap();
        assert_eq!(moved.po_id, Some(Some(4)));
    }

    #[test]
    fn create_request_requires_date_vendor_and_store() {
        let request = CreatePurchaseOrderRequest::default();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("po_date"));
        assert!(fields.contains_key("vendor_id"));
        assert!(fields.contains_key("store_id"));
    }
}
