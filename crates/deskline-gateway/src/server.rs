// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the JSON API and the
//! web pages.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use deskline_config::model::{DesklineConfig, GatewayConfig};
use deskline_core::{DesklineError, StorageAdapter};
use deskline_identity::{SharedKeyVerifier, UserResolver};
use deskline_tickets::TicketManager;

use crate::{api, web};

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<UserResolver>,
    pub tickets: Arc<TicketManager>,
    /// Consulted by the health endpoint.
    pub storage: Arc<dyn StorageAdapter>,
    pub health: HealthState,
    /// Rows returned by `GET /searches`.
    pub recent_searches_limit: u32,
}

impl AppState {
    /// Wire the resolver and ticket manager over `storage`.
    ///
    /// Upserts are verified against `identity.upsert_key`.
    pub fn from_config(
        config: &DesklineConfig,
        storage: Arc<dyn StorageAdapter>,
    ) -> Result<Self, DesklineError> {
        let verifier = Arc::new(SharedKeyVerifier::from_config(&config.identity));
        let resolver = UserResolver::new(storage.clone(), verifier, &config.identity)?;
        let tickets = TicketManager::new(storage.clone(), &config.tickets);
        Ok(Self {
            resolver: Arc::new(resolver),
            tickets: Arc::new(tickets),
            storage,
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
            recent_searches_limit: config.tickets.recent_searches_limit,
        })
    }
}

/// Build the full application router.
///
/// The JSON API is nested under `api_prefix`; web pages live at the root.
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let api_routes = Router::new()
        .route("/user/create", post(api::post_user_create))
        .route("/user/ticket-create", post(api::post_ticket_create))
        .route("/user/ticket-create/phn", post(api::post_ticket_create_by_phone))
        .route("/user/ticket/{id}", get(api::get_ticket))
        .route("/user/last-ticket/{id}", get(api::get_last_ticket))
        .route("/user/{id}", get(api::get_user))
        .route("/user-phone/{phone}", get(api::get_user_by_phone))
        .route("/ticket-status/{id}", put(api::put_ticket_status))
        .route("/searches", get(api::get_searches))
        .route("/health", get(api::get_health))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let web_routes = Router::new()
        .route("/", get(web::users_index))
        .route("/users", get(web::users_index).post(web::users_store))
        .route("/users/create", get(web::users_create))
        .route(
            "/users/{id}",
            get(web::users_show)
                .put(web::users_update)
                .post(web::users_update),
        )
        .route("/users/{id}/edit", get(web::users_edit))
        .route("/tickets", get(web::tickets_index).post(web::tickets_store))
        .route("/tickets/create", get(web::tickets_create))
        .route(
            "/tickets/{id}",
            get(web::tickets_show)
                .put(web::tickets_update)
                .post(web::tickets_update),
        )
        .route("/tickets/{id}/edit", get(web::tickets_edit))
        .fallback(web::not_found)
        .with_state(state);

    Router::new()
        .nest(api_prefix, api_routes)
        .merge(web_routes)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &GatewayConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), DesklineError> {
    let app = build_router(state, &config.api_prefix);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DesklineError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(api_prefix = %config.api_prefix, "gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| DesklineError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_state_is_clone() {
        let state = HealthState {
            start_time: std::time::Instant::now(),
        };
        let cloned = state.clone();
        assert!(cloned.start_time.elapsed().as_secs() < 60);
    }
}
