//! Book management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use hearth_db::entities::{books, sea_orm_active_enums::MemberRole};
use hearth_db::repositories::{BookError, BookRepository, CreateBookInput, UpdateBookInput};

/// Creates the books router (requires auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", post(create_book))
        .route("/books", get(list_books))
        .route("/books/{book_id}", get(get_book))
        .route("/books/{book_id}", patch(update_book))
        .route("/books/{book_id}", delete(delete_book))
        .route("/books/{book_id}/invitation", post(regenerate_invitation))
}

/// Request payload for creating a book.
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    /// Book name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Currency code; defaults to IDR.
    pub currency: Option<String>,
    /// Budget in minor units.
    pub budget: Option<i64>,
}

/// Request payload for updating a book. Absent fields are untouched;
/// explicit nulls clear nullable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    /// New name.
    pub name: Option<String>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// New budget; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub budget: Option<Option<i64>>,
}

/// Distinguishes an absent field (outer `None`) from an explicit `null`
/// (inner `None`).
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

fn book_json(book: &books::Model, role: MemberRole) -> serde_json::Value {
    json!({
        "id": book.id,
        "name": book.name,
        "description": book.description,
        "creator_id": book.creator_id,
        "budget": book.budget,
        "currency": book.currency,
        "invitation_code": book.invitation_code,
        "role": role,
        "created_at": book.created_at,
        "updated_at": book.updated_at,
    })
}

fn book_error(e: &BookError) -> Response {
    if matches!(e, BookError::Database(_) | BookError::CodeExhausted) {
        error!(error = %e, "Book operation failed");
    }
    error_response(e.status_code(), e.error_code(), e.to_string())
}

/// POST /books - Create a new book owned by the caller.
async fn create_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBookRequest>,
) -> impl IntoResponse {
    let repo = BookRepository::new((*state.db).clone());

    let input = CreateBookInput {
        name: payload.name,
        description: payload.description,
        currency: payload.currency,
        budget: payload.budget,
    };

    match repo.create_with_creator(auth.user_id(), input).await {
        Ok(book) => {
            info!(book_id = %book.id, user_id = %auth.user_id(), "Book created");
            (
                StatusCode::CREATED,
                Json(book_json(&book, MemberRole::Creator)),
            )
                .into_response()
        }
        Err(e) => book_error(&e),
    }
}

/// GET /books - List the caller's books.
async fn list_books(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = BookRepository::new((*state.db).clone());

    match repo.list_for_user(auth.user_id()).await {
        Ok(books) => {
            let body: Vec<_> = books
                .iter()
                .map(|(book, role)| book_json(book, *role))
                .collect();
            (StatusCode::OK, Json(json!({ "books": body }))).into_response()
        }
        Err(e) => book_error(&e),
    }
}

/// GET /books/{book_id} - Fetch one book the caller belongs to.
async fn get_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BookRepository::new((*state.db).clone());

    match repo.find_for_member(book_id, auth.user_id()).await {
        Ok((book, role)) => (StatusCode::OK, Json(book_json(&book, role))).into_response(),
        Err(e) => book_error(&e),
    }
}

/// PATCH /books/{book_id} - Update book settings.
async fn update_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> impl IntoResponse {
    let repo = BookRepository::new((*state.db).clone());

    let input = UpdateBookInput {
        name: payload.name,
        description: payload.description,
        budget: payload.budget,
    };

    match repo.update(book_id, auth.user_id(), input).await {
        Ok(book) => {
            info!(book_id = %book.id, "Book updated");
            match repo.find_for_member(book_id, auth.user_id()).await {
                Ok((_, role)) => (StatusCode::OK, Json(book_json(&book, role))).into_response(),
                Err(e) => book_error(&e),
            }
        }
        Err(e) => book_error(&e),
    }
}

/// DELETE /books/{book_id} - Delete a book. Creator only.
async fn delete_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BookRepository::new((*state.db).clone());

    match repo.delete(book_id, auth.user_id()).await {
        Ok(()) => {
            info!(book_id = %book_id, user_id = %auth.user_id(), "Book deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Book deleted" })),
            )
                .into_response()
        }
        Err(e) => book_error(&e),
    }
}

/// POST /books/{book_id}/invitation - Replace the invitation code.
async fn regenerate_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BookRepository::new((*state.db).clone());

    match repo.regenerate_code(book_id, auth.user_id()).await {
        Ok(book) => {
            info!(book_id = %book.id, "Invitation code regenerated");
            (
                StatusCode::OK,
                Json(json!({ "invitation_code": book.invitation_code })),
            )
                .into_response()
        }
        Err(e) => book_error(&e),
    }
}
