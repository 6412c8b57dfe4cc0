//! Transaction ledger routes: list, submit, decide, delete.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use hearth_core::workflow::{Decision, TransactionKind, TransactionStatus};
use hearth_db::repositories::{
    LedgerError, LedgerRepository, SubmitTransactionInput, TransactionFilter, TransactionRecord,
};

/// Creates the transactions router (requires auth middleware applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/{book_id}/transactions", get(list_transactions))
        .route("/books/{book_id}/transactions", post(submit_transaction))
        .route(
            "/books/{book_id}/transactions/{tx_id}/decision",
            post(decide_transaction),
        )
        .route(
            "/books/{book_id}/transactions/{tx_id}",
            delete(delete_transaction),
        )
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Keep only this status: `pending`, `approved`, or `rejected`.
    pub status: Option<String>,
    /// Substring search over description, category, and submitter name.
    pub search: Option<String>,
}

/// Request payload for submitting a transaction.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// `income` or `expense`.
    pub kind: String,
    /// Free-text category.
    #[serde(default)]
    pub category: String,
    /// Amount in minor units, positive.
    pub amount: i64,
    /// Description of the transaction.
    pub description: String,
    /// Effective date (`YYYY-MM-DD`).
    pub date: NaiveDate,
}

/// Request payload for deciding a pending transaction.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `approve` or `reject`.
    pub decision: String,
}

fn record_json(record: &TransactionRecord) -> serde_json::Value {
    let tx = &record.transaction;
    json!({
        "id": tx.id,
        "book_id": tx.book_id,
        "submitted_by": tx.user_id,
        "submitter_name": record.submitter_name,
        "kind": tx.kind,
        "category": tx.category,
        "amount": tx.amount,
        "description": tx.description,
        "date": tx.date,
        "status": tx.status,
        "decided_by": tx.decided_by,
        "created_at": tx.created_at,
        "updated_at": tx.updated_at,
    })
}

fn ledger_error(e: &LedgerError) -> Response {
    if matches!(e, LedgerError::Database(_)) {
        error!(error = %e, "Ledger operation failed");
    }
    error_response(e.status_code(), e.error_code(), e.to_string())
}

/// GET /books/{book_id}/transactions - List transactions with the
/// book's budget summary.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match TransactionStatus::parse(raw) {
            Some(s) => Some(s),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": format!("Unknown status filter: {raw}")
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = LedgerRepository::new((*state.db).clone());
    let filter = TransactionFilter {
        status,
        search: query.search,
    };

    match repo.list(book_id, auth.user_id(), filter).await {
        Ok(page) => {
            let transactions: Vec<_> = page.transactions.iter().map(record_json).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "transactions": transactions,
                    "summary": page.summary,
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error(&e),
    }
}

/// POST /books/{book_id}/transactions - Submit a new transaction.
async fn submit_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<SubmitRequest>,
) -> impl IntoResponse {
    let Some(kind) = TransactionKind::parse(&payload.kind) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_kind",
                "message": format!("Kind must be income or expense, got: {}", payload.kind)
            })),
        )
            .into_response();
    };

    let repo = LedgerRepository::new((*state.db).clone());
    let input = SubmitTransactionInput {
        kind,
        category: payload.category,
        amount: payload.amount,
        description: payload.description,
        date: payload.date,
    };

    match repo.submit(book_id, auth.user_id(), input).await {
        Ok(tx) => {
            info!(book_id = %book_id, transaction_id = %tx.id, "Transaction submitted");
            (StatusCode::CREATED, Json(tx)).into_response()
        }
        Err(e) => ledger_error(&e),
    }
}

/// POST /books/{book_id}/transactions/{tx_id}/decision - Approve or
/// reject a pending transaction.
async fn decide_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, tx_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DecisionRequest>,
) -> impl IntoResponse {
    let Some(decision) = Decision::parse(&payload.decision) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_decision",
                "message": format!(
                    "Decision must be approve or reject, got: {}",
                    payload.decision
                )
            })),
        )
            .into_response();
    };

    let repo = LedgerRepository::new((*state.db).clone());

    match repo.decide(book_id, tx_id, auth.user_id(), decision).await {
        Ok(tx) => {
            info!(
                transaction_id = %tx.id,
                decided_by = %auth.user_id(),
                status = ?tx.status,
                "Transaction decided"
            );
            (StatusCode::OK, Json(tx)).into_response()
        }
        Err(e) => ledger_error(&e),
    }
}

/// DELETE /books/{book_id}/transactions/{tx_id} - Hard-delete a
/// transaction.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, tx_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.delete(book_id, tx_id, auth.user_id()).await {
        Ok(()) => {
            info!(transaction_id = %tx_id, "Transaction deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Transaction deleted" })),
            )
                .into_response()
        }
        Err(e) => ledger_error(&e),
    }
}
