use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use service::errors::ServiceError;
use service::ledger::model::AccountSummary;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// List a client's accounts.
pub async fn list(
    State(state): State<ServerState>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<AccountSummary>>, JsonApiError> {
    let accounts = state.store.list_accounts(&client_id).await?;
    Ok(Json(accounts))
}

/// Fetch one account of a client.
pub async fn get(
    State(state): State<ServerState>,
    Path((client_id, account_id)): Path<(String, String)>,
) -> Result<Json<AccountSummary>, JsonApiError> {
    let summary = state.store.get_account(&client_id, &account_id).await?;
    Ok(Json(summary))
}

/// Open a new empty account for a client.
pub async fn create(
    State(state): State<ServerState>,
    Path(client_id): Path<String>,
) -> Result<Json<AccountSummary>, JsonApiError> {
    let summary = state.store.create_account(&client_id).await?;
    info!(client_id = %client_id, account_id = %summary.id, "opened account");
    Ok(Json(summary))
}

/// Close an account.
pub async fn delete(
    State(state): State<ServerState>,
    Path((client_id, account_id)): Path<(String, String)>,
) -> StatusCode {
    match state.store.delete_account(&client_id, &account_id).await {
        Ok(true) => {
            info!(client_id = %client_id, account_id = %account_id, "closed account");
            StatusCode::NO_CONTENT
        }
        Ok(false) => StatusCode::NOT_FOUND,
        Err(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
