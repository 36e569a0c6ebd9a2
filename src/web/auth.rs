use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::db;
use crate::domain::leveling::Progress;
use crate::state::SharedState;
use crate::web::profile::ProfileView;
use crate::web::session;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

async fn register(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if !state.auth_limiter.check(&addr.ip().to_string()).await {
        tracing::warn!("registration rate limit exceeded for {}", addr.ip());
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();
    if !email.contains('@') || name.is_empty() || payload.password.len() < 6 {
        return Err(StatusCode::BAD_REQUEST);
    }

    if db::find_user_by_email(&state.pool, &email)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        return Err(StatusCode::CONFLICT);
    }

    let salt = SaltString::generate(rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("password hashing failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .to_string();

    let user_id = Uuid::new_v4();
    db::create_user(&state.pool, user_id, &email, &hash, &name, Progress::starting())
        .await
        .map_err(|e| {
            tracing::error!("failed to create user: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!("registered user {user_id}");

    let token =
        session::sign_session(user_id, &state.session_key).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let profile = db::get_profile(&state.pool, user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((session_cookie(&token), Json(ProfileView::from_row(profile))))
}

async fn login(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if !state.auth_limiter.check(&addr.ip().to_string()).await {
        tracing::warn!("login rate limit exceeded for {}", addr.ip());
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let email = payload.email.trim().to_lowercase();
    let user = db::find_user_by_email(&state.pool, &email)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let parsed_hash = PasswordHash::new(&user.hash).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Session start doubles as the opportunistic daily-reset and
    // mirror-reconciliation point.
    state.ledger.sync_on_login(user.id).await;

    let token =
        session::sign_session(user.id, &state.session_key).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let profile = db::get_profile(&state.pool, user.id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((session_cookie(&token), Json(ProfileView::from_row(profile))))
}

async fn logout() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::SET_COOKIE,
        "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
            .parse()
            .expect("static cookie header"),
    );
    (headers, StatusCode::NO_CONTENT)
}

fn session_cookie(token: &str) -> HeaderMap {
    let secure_flag = if std::env::var("PRODUCTION").is_ok() { "; Secure" } else { "" };
    let mut headers = HeaderMap::new();
    if let Ok(value) =
        format!("session={token}; HttpOnly; SameSite=Lax; Path=/{secure_flag}").parse()
    {
        headers.insert(axum::http::header::SET_COOKIE, value);
    }
    headers
}
