use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::User,
        services::normalize_registration,
    },
    db,
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

const EMAIL_TAKEN: &str = "Email already registered";
const USERNAME_TAKEN: &str = "Username already taken";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/login/json", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let payload = normalize_registration(payload).map_err(|e| {
        warn!(error = %e, "invalid registration");
        e
    })?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::bad_request(EMAIL_TAKEN));
    }
    if User::find_by_username(&state.db, &payload.username).await?.is_some() {
        warn!(username = %payload.username, "username already taken");
        return Err(AppError::bad_request(USERNAME_TAKEN));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, &payload.email, &payload.username, &hash).await {
        Ok(u) => u,
        // lost a race with a concurrent registration
        Err(e) => {
            return Err(match db::unique_violation(&e) {
                Some(c) if c.contains("username") => AppError::bad_request(USERNAME_TAKEN),
                Some(_) => AppError::bad_request(EMAIL_TAKEN),
                None => AppError::Internal(anyhow::Error::new(e).context("create user")),
            })
        }
    };

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let username = payload.username.trim();
    let invalid = || AppError::unauthorized("Incorrect username or password");

    let Some(user) = User::find_by_username(&state.db, username).await? else {
        warn!(%username, "login unknown username");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let keys = JwtKeys::from_ref(&state);
    let (access_token, refresh_token) = keys.sign_pair(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::unauthorized("Invalid refresh token")
    })?;

    if User::find_by_id(&state.db, claims.sub).await?.is_none() {
        warn!(user_id = %claims.sub, "refresh for unknown user");
        return Err(AppError::unauthorized("User not found"));
    }

    let (access_token, refresh_token) = keys.sign_pair(claims.sub)?;
    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            username: "tester".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"username\":\"tester\""));
        assert!(json.contains("1970-01-01T00:00:00Z"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn token_response_is_bearer() {
        let json = serde_json::to_value(TokenResponse::bearer("a".into(), "r".into())).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
    }
}
