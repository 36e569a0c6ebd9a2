use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, ProfileRow};
use crate::domain::models::PersonalInfo;
use crate::state::SharedState;
use crate::web::session::UserSession;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub xp: i32,
    pub xp_to_next_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
}

impl ProfileView {
    pub fn from_row(row: ProfileRow) -> Self {
        let personal_info = row
            .personal_info
            .and_then(|value| serde_json::from_value::<PersonalInfo>(value).ok());
        ProfileView {
            id: row.user_id,
            name: row.name,
            level: row.level,
            xp: row.xp,
            xp_to_next_level: row.xp_to_next_level,
            personal_info,
        }
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/survey", get(get_survey))
        .route("/survey", put(put_survey))
        .with_state(state)
}

async fn me(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<ProfileView>, StatusCode> {
    let profile = db::get_profile(&state.pool, user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ProfileView::from_row(profile)))
}

async fn get_survey(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Option<PersonalInfo>>, StatusCode> {
    let profile = db::get_profile(&state.pool, user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let info = profile
        .personal_info
        .and_then(|value| serde_json::from_value::<PersonalInfo>(value).ok());
    Ok(Json(info))
}

/// The one-time survey. Re-submitting replaces the stored answers wholesale.
async fn put_survey(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Json(info): Json<PersonalInfo>,
) -> Result<StatusCode, StatusCode> {
    let value = serde_json::to_value(&info).map_err(|_| StatusCode::BAD_REQUEST)?;
    db::set_personal_info(&state.pool, user_id, &value)
        .await
        .map_err(|e| {
            tracing::error!("failed to store survey for {user_id}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(StatusCode::NO_CONTENT)
}
