//! Authentication routes for register and login.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use hearth_core::auth::{hash_password, verify_password};
use hearth_db::UserRepository;
use hearth_shared::AuthTokens;

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Registration request payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address, unique per account.
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
}

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Response for successful register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated account.
    pub user: UserInfo,
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let name = payload.name.trim();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Name must not be empty"
            })),
        )
            .into_response();
    }
    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_email",
                "message": "A valid email address is required"
            })),
        )
            .into_response();
    }
    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_password",
                "message": "Password must be at least 8 characters"
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    let user = match user_repo.create(name, &payload.email, &password_hash).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error();
        }
    };

    let access_token = match state.jwt_service.generate_access_token(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, "User registered");

    let response = AuthResponse {
        user: UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        tokens: AuthTokens {
            access_token,
            expires_in: state.jwt_service.access_token_expires_in(),
        },
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// POST /auth/login - Authenticate a user and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    let access_token = match state.jwt_service.generate_access_token(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, "User logged in");

    let response = AuthResponse {
        user: UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
        },
        tokens: AuthTokens {
            access_token,
            expires_in: state.jwt_service.access_token_expires_in(),
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An unexpected error occurred"
        })),
    )
        .into_response()
}
