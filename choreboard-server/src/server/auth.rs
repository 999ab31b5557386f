use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use choreboard_shared::auth::Role;
use choreboard_shared::jwt::{self, JwtClaims};
use tracing::{error, warn};

use super::{AppError, AppState};
use crate::storage::Actor;
use crate::storage::models::User;

/// How many days before mandatory re-login.
const USER_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Clone, Debug)]
pub struct AuthCtx {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

pub async fn require_bearer(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || Err(AppError::unauthorized());
    let header_val = match req.headers().get(header::AUTHORIZATION) {
        Some(v) => v,
        None => return unauthorized(),
    };
    let header_str = header_val.to_str().map_err(|_| AppError::unauthorized())?;
    let Some(token) = header_str.strip_prefix("Bearer ") else {
        return unauthorized();
    };

    let claims = match jwt::decode_and_verify(token, state.config.jwt_secret.as_bytes()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error=%e, "auth: jwt decode failed");
            return unauthorized();
        }
    };

    // The account may have been removed or changed role since the token was issued.
    let user = state.store.get_user(claims.uid).await.map_err(|e| {
        error!(uid = claims.uid, error=%e, "auth: user lookup failed");
        AppError::internal(e)
    })?;
    let Some(user) = user else {
        warn!(uid = claims.uid, username=%claims.sub, "auth: token for unknown user");
        return unauthorized();
    };
    if user.username != claims.sub || user.role != claims.role.as_str() {
        warn!(
            uid = claims.uid,
            username = %claims.sub,
            token_role = %claims.role,
            actual_role = %user.role,
            "auth: token does not match account"
        );
        return unauthorized();
    }

    let auth = AuthCtx {
        user_id: user.id,
        username: user.username,
        role: claims.role,
    };
    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}

pub fn issue_jwt_for_user(state: &AppState, user: &User) -> Result<String, AppError> {
    let role: Role = user.role.parse().map_err(|e: String| {
        error!(username = %user.username, error = %e, "login: stored role is invalid");
        AppError::internal(e)
    })?;
    let claims = JwtClaims {
        sub: user.username.clone(),
        uid: user.id,
        jti: uuid::Uuid::new_v4().to_string(),
        exp: (Utc::now() + Duration::days(USER_TOKEN_TTL_DAYS)).timestamp(),
        role,
    };
    jwt::encode(&claims, state.config.jwt_secret.as_bytes()).map_err(|e| {
        error!(username = %user.username, error=%e, "login: jwt encode failed");
        AppError::internal(e)
    })
}
