use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::ledger::store::LedgerStore;

pub mod accounts;
pub mod clients;
pub mod operations;

/// Shared handler state: the ledger store behind its trait seam.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn LedgerStore>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public: Router<ServerState> = Router::new().route("/health", get(health));

    let api: Router<ServerState> = Router::new()
        .route("/clients/", get(clients::list).post(clients::create))
        .route(
            "/clients/:client_id",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route(
            "/clients/:client_id/accounts",
            get(accounts::list).post(accounts::create),
        )
        .route(
            "/clients/:client_id/accounts/:account_id",
            get(accounts::get).delete(accounts::delete),
        )
        .route(
            "/clients/:client_id/accounts/:account_id/withdrawal",
            post(operations::withdrawal),
        )
        .route(
            "/clients/:client_id/accounts/:account_id/deposit",
            post(operations::deposit),
        )
        .route(
            "/clients/:client_id/accounts/:account_id/transactions",
            get(operations::transactions),
        );

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
