//! Membership routes: join, leave, list, promote, demote, remove.

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
use hearth_db::repositories::{MemberError, MemberRepository, MemberWithUser};

/// Creates the membership router (requires auth middleware applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books/join", post(join_book))
        .route("/books/{book_id}/leave", post(leave_book))
        .route("/books/{book_id}/members", get(list_members))
        .route("/books/{book_id}/members/{user_id}", patch(change_role))
        .route("/books/{book_id}/members/{user_id}", delete(remove_member))
}

/// Request payload for joining a book by invitation code.
#[derive(Debug, Deserialize)]
pub struct JoinBookRequest {
    /// The invitation code; case-insensitive.
    pub code: String,
}

/// Request payload for changing a member's role.
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// The desired role: `admin` or `member`.
    pub role: String,
}

fn member_json(member: &MemberWithUser) -> serde_json::Value {
    json!({
        "user_id": member.user.id,
        "name": member.user.name,
        "email": member.user.email,
        "role": member.membership.role,
        "joined_at": member.membership.joined_at,
    })
}

fn member_error(e: &MemberError) -> Response {
    if matches!(e, MemberError::Database(_)) {
        error!(error = %e, "Membership operation failed");
    }
    error_response(e.status_code(), e.error_code(), e.to_string())
}

/// POST /books/join - Redeem an invitation code.
async fn join_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<JoinBookRequest>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());

    match repo.redeem_code(&payload.code, auth.user_id()).await {
        Ok((book, membership)) => {
            info!(book_id = %book.id, user_id = %auth.user_id(), "User joined book");
            (
                StatusCode::OK,
                Json(json!({
                    "book": {
                        "id": book.id,
                        "name": book.name,
                        "description": book.description,
                        "currency": book.currency,
                    },
                    "role": membership.role,
                    "joined_at": membership.joined_at,
                })),
            )
                .into_response()
        }
        Err(e) => member_error(&e),
    }
}

/// POST /books/{book_id}/leave - Leave a book voluntarily.
async fn leave_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());

    match repo.leave(book_id, auth.user_id()).await {
        Ok(()) => {
            info!(book_id = %book_id, user_id = %auth.user_id(), "User left book");
            (StatusCode::OK, Json(json!({ "message": "Left book" }))).into_response()
        }
        Err(e) => member_error(&e),
    }
}

/// GET /books/{book_id}/members - List the book's members.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(book_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());

    match repo.list(book_id, auth.user_id()).await {
        Ok(members) => {
            let body: Vec<_> = members.iter().map(member_json).collect();
            (StatusCode::OK, Json(json!({ "members": body }))).into_response()
        }
        Err(e) => member_error(&e),
    }
}

/// PATCH /books/{book_id}/members/{user_id} - Promote or demote a member.
async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ChangeRoleRequest>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());

    let result = match payload.role.to_lowercase().as_str() {
        "admin" => repo.promote(book_id, auth.user_id(), user_id).await,
        "member" => repo.demote(book_id, auth.user_id(), user_id).await,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_role",
                    "message": format!("Role must be admin or member, got: {other}")
                })),
            )
                .into_response();
        }
    };

    match result {
        Ok(membership) => {
            info!(
                book_id = %book_id,
                user_id = %user_id,
                role = %payload.role,
                "Member role changed"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "user_id": membership.user_id,
                    "role": membership.role,
                })),
            )
                .into_response()
        }
        Err(e) => member_error(&e),
    }
}

/// DELETE /books/{book_id}/members/{user_id} - Remove a member.
async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((book_id, user_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());

    match repo.remove(book_id, auth.user_id(), user_id).await {
        Ok(()) => {
            info!(book_id = %book_id, removed = %user_id, "Member removed");
            (StatusCode::OK, Json(json!({ "message": "Member removed" }))).into_response()
        }
        Err(e) => member_error(&e),
    }
}
