use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use carhire_core::{BookingError, CallerIdentity, Role, StoreError, User};
use carhire_shared::Masked;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::{issue_token, user_auth_middleware};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RoleChangeResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/user/data", get(user_data))
        .route("/api/owner/change-role", post(change_role))
        .route_layer(from_fn_with_state(state, user_auth_middleware));

    Router::new()
        .route("/api/user/register", post(register))
        .route("/api/user/login", post(login))
        .merge(protected)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Argon2 is deliberately slow; keep it off the async workers
async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))?
    .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;

    Ok(hashed)
}

async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    let matches = tokio::task::spawn_blocking(move || {
        PasswordHash::new(&stored_hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| anyhow::anyhow!("Password check task failed: {}", e))?
    .map_err(|e| anyhow::anyhow!("Stored password hash is unreadable: {}", e))?;

    Ok(matches)
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);
    let password = payload.password.into_inner();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Name, email and password are required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("Email address is not valid".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = hash_password(password).await?;
    let user = User::new(name, email, password_hash);

    match state.repos.users.create_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, email = %Masked(&user.email), "User registered");
    let token = issue_token(&state.auth, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { success: true, token })))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email);
    let user = state
        .repos
        .users
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(payload.password.into_inner(), user.password_hash.clone()).await? {
        tracing::debug!(email = %Masked(&email), "Login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(&state.auth, &user)?;
    Ok(Json(AuthResponse { success: true, token }))
}

pub async fn user_data(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .repos
        .users
        .get_user(caller.user_id)
        .await?
        .ok_or(BookingError::UserNotAuthenticated)?;

    Ok(Json(UserResponse { success: true, user }))
}

pub async fn change_role(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<RoleChangeResponse>, AppError> {
    let user = state
        .repos
        .users
        .set_user_role(caller.user_id, Role::Owner)
        .await?
        .ok_or(BookingError::UserNotAuthenticated)?;

    tracing::info!(user_id = %user.id, "User promoted to owner");
    let token = issue_token(&state.auth, &user)?;

    Ok(Json(RoleChangeResponse {
        success: true,
        message: "Now you can list cars".to_string(),
        token,
        user,
    }))
}
