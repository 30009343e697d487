//! Procurement API Library
//!
//! Purchase orders with line items, derived VDS/TDS amounts, order totals and
//! sequential `PO` numbering, served over a JWT-protected REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod numbering;
pub mod openapi;
pub mod pricing;
pub mod services;
pub mod tracing;

use axum::Router;
use http::HeaderValue;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::auth::{AuthRouterExt, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Option<Arc<events::EventSender>>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            auth::AuthConfig::from(&config),
            db.clone(),
        ));
        let services = handlers::AppServices::new(
            db.clone(),
            event_sender,
            services::PurchaseOrderSettings::from(&config),
        );
        Self {
            db,
            config,
            services,
            auth,
        }
    }
}

/// Everything under `/api/v1`. Only sign-up and login skip the bearer check.
pub fn api_v1_routes(auth_service: Arc<AuthService>) -> Router<AppState> {
    let purchase_orders =
        handlers::purchase_orders::purchase_order_routes().with_auth(auth_service.clone());
    let account = handlers::auth::protected_auth_routes().with_auth(auth_service);

    Router::new()
        .nest("/purchase-orders", purchase_orders)
        .nest(
            "/auth",
            handlers::auth::public_auth_routes().merge(account),
        )
}

/// Full application router with request ids, tracing and compression.
/// CORS is left to the caller; see [`cors_layer`].
pub fn app_router(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(handlers::health::health_routes())
        .merge(openapi::openapi_routes())
        .nest("/api/v1", api_v1_routes(state.auth.clone()))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

/// Builds the CORS layer from configuration. Fails outside development
/// when no origins are configured and permissive CORS was not requested.
pub fn cors_layer(cfg: &config::AppConfig) -> Result<CorsLayer, String> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        Err("Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(environment: &str) -> config::AppConfig {
        config::AppConfig::new(
            "sqlite::memory:".into(),
            "a_long_enough_test_secret_for_hs256_tokens".into(),
            3600,
            "127.0.0.1".into(),
            8080,
            environment.into(),
        )
    }

    #[test]
    fn development_allows_permissive_cors() {
        assert!(cors_layer(&cfg("development")).is_ok());
    }

    #[test]
    fn production_requires_origins() {
        let mut production = cfg("production");
        assert!(cors_layer(&production).is_err());

        production.cors_allowed_origins = Some("https://erp.example.com, ".into());
        assert!(cors_layer(&production).is_ok());
    }
}
