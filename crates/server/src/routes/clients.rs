use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use service::ledger::model::{ClientInput, ClientRecord};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// List every client of the bank.
pub async fn list(State(state): State<ServerState>) -> Json<Vec<ClientRecord>> {
    Json(state.store.list_clients().await)
}

/// Fetch one client by id.
pub async fn get(
    State(state): State<ServerState>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientRecord>, JsonApiError> {
    let record = state.store.get_client(&client_id).await?;
    Ok(Json(record))
}

/// Register a new client.
pub async fn create(
    State(state): State<ServerState>,
    Json(input): Json<ClientInput>,
) -> Result<Json<ClientRecord>, JsonApiError> {
    let record = state.store.create_client(input).await?;
    info!(id = %record.id, "created client");
    Ok(Json(record))
}

/// Update a client's names.
pub async fn update(
    State(state): State<ServerState>,
    Path(client_id): Path<String>,
    Json(input): Json<ClientInput>,
) -> Result<Json<ClientRecord>, JsonApiError> {
    let record = state.store.update_client(&client_id, input).await?;
    info!(id = %record.id, "updated client");
    Ok(Json(record))
}

/// Remove a client and every account it owns.
pub async fn delete(
    State(state): State<ServerState>,
    Path(client_id): Path<String>,
) -> StatusCode {
    match state.store.delete_client(&client_id).await {
        Ok(true) => {
            info!(id = %client_id, "deleted client");
            StatusCode::NO_CONTENT
        }
        Ok(false) => StatusCode::NOT_FOUND,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
