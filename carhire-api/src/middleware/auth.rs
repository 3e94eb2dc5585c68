use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use carhire_core::{BookingError, CallerIdentity, Role, User};

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

impl UserClaims {
    pub fn caller(&self) -> CallerIdentity {
        CallerIdentity {
            user_id: self.sub,
            role: self.role,
        }
    }
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = UserClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token encoding failed: {}", e)))
}

/// Accepts `Bearer <token>` as well as a bare token.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserClaims, BookingError> {
    let token = bearer_token(headers).ok_or(BookingError::UserNotAuthenticated)?;

    let token_data = decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        BookingError::UserNotAuthenticated
    })?;

    Ok(token_data.claims)
}

// ============================================================================
// User Authentication Middleware
// ============================================================================

pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&state, req.headers())?;

    req.extensions_mut().insert(claims.caller());
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Owner Authentication Middleware
// ============================================================================

pub async fn owner_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(&state, req.headers())?;

    if claims.role != Role::Owner {
        return Err(BookingError::NotPermitted("Only car owners can do this".to_string()).into());
    }

    req.extensions_mut().insert(claims.caller());
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
