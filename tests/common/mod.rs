#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use procurement_api::{
    config::AppConfig,
    db,
    services::{CreatePurchaseOrderRequest, DetailInput, PurchaseOrderWithDetails},
    app_router, AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "procurement_test_secret_0123456789_abcdefghij";
pub const TEST_EMAIL: &str = "buyer@example.com";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Application state over a throwaway SQLite file, plus a signed-in user.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub token: String,
    pub user_id: String,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("procurement_test.db").display()
        );

        let mut cfg = AppConfig::new(
            url,
            TEST_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg, None);

        let account = state
            .auth
            .sign_up("Test Buyer", TEST_EMAIL, TEST_PASSWORD)
            .await
            .expect("sign up test user");
        let token = state
            .auth
            .login(TEST_EMAIL, TEST_PASSWORD)
            .await
            .expect("login test user")
            .access_token;

        Self {
            router: app_router(state.clone()),
            state,
            token,
            user_id: account.id.to_string(),
            _dir: dir,
        }
    }

    pub fn actor(&self) -> Option<&str> {
        Some(self.user_id.as_str())
    }

    /// Sends an authenticated request and returns status plus JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, body, Some(&self.token)).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    /// Creates an order through the service with the given lines.
    pub async fn create_order(
        &self,
        parent: Option<i32>,
        details: Vec<DetailInput>,
    ) -> PurchaseOrderWithDetails {
        self.state
            .services
            .purchase_orders
            .create(order_request(parent, details), self.actor())
            .await
            .expect("create purchase order")
    }
}

pub fn order_request(parent: Option<i32>, details: Vec<DetailInput>) -> CreatePurchaseOrderRequest {
    CreatePurchaseOrderRequest {
        po_id: parent,
        po_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
        po_type: Some("Local".to_string()),
        pay_mode: Some("Cash".to_string()),
        currency: Some("BDT".to_string()),
        company_code: Some("C01".to_string()),
        vendor_id: Some(11),
        store_id: Some(3),
        details,
        ..Default::default()
    }
}

pub fn line(line_no: i32, quantity: &str, unit_price: &str, discount: &str) -> DetailInput {
    DetailInput {
        line_no: Some(line_no),
        inv_product_id: Some(100 + line_no),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
        discount: dec(discount),
        ..Default::default()
    }
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("decimal literal")
}

/// Decimals come back from SQLite through a float column.
pub fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Reads a decimal that serde emitted as a JSON string.
pub fn json_dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => dec(s).round_dp(2),
        Value::Number(n) => dec(&n.to_string()).round_dp(2),
        other => panic!("not a decimal: {other}"),
    }
}
