use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use service::ledger::model::{AccountSummary, OperationInput, Transaction};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// Credit an account.
pub async fn deposit(
    State(state): State<ServerState>,
    Path((client_id, account_id)): Path<(String, String)>,
    Json(input): Json<OperationInput>,
) -> Result<Json<AccountSummary>, JsonApiError> {
    let summary = state.store.deposit(&client_id, &account_id, input).await?;
    info!(client_id = %client_id, account_id = %account_id, balance = summary.balance, "deposit applied");
    Ok(Json(summary))
}

/// Debit an account; refused when the balance would go negative.
pub async fn withdrawal(
    State(state): State<ServerState>,
    Path((client_id, account_id)): Path<(String, String)>,
    Json(input): Json<OperationInput>,
) -> Result<Json<AccountSummary>, JsonApiError> {
    let summary = state.store.withdraw(&client_id, &account_id, input).await?;
    info!(client_id = %client_id, account_id = %account_id, balance = summary.balance, "withdrawal applied");
    Ok(Json(summary))
}

/// Full transaction history of an account, oldest first.
pub async fn transactions(
    State(state): State<ServerState>,
    Path((client_id, account_id)): Path<(String, String)>,
) -> Result<Json<Vec<Transaction>>, JsonApiError> {
    let history = state.store.list_transactions(&client_id, &account_id).await?;
    Ok(Json(history))
}
