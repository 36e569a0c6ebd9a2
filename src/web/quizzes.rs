use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::domain::models::{Category, PersonalInfo, Quiz};
use crate::services::progress::CompletionOutcome;
use crate::state::SharedState;
use crate::web::session::UserSession;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestView {
    id: String,
    title: String,
    description: String,
    xp_reward: i32,
    completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    score: i32,
    earned_xp: i32,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/categories", get(categories))
        .route("/quests", get(quests))
        .route("/quizzes/:quiz_id/questions", post(load_questions))
        .route("/quizzes/:quiz_id/complete", post(complete_quiz))
        .with_state(state)
}

async fn categories(State(state): State<SharedState>) -> Json<Vec<Category>> {
    Json(state.catalog.categories().to_vec())
}

async fn quests(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
) -> Json<Vec<QuestView>> {
    let done = state.ledger.completed_quests_today(user_id).await;
    let views = state
        .quest_book
        .all()
        .iter()
        .map(|quest| QuestView {
            id: quest.id.clone(),
            title: quest.title.clone(),
            description: quest.description.clone(),
            xp_reward: quest.xp_reward,
            completed: done.contains(&quest.id),
        })
        .collect();
    Json(views)
}

/// Run the load pipeline for one quiz. The response always carries a playable
/// question list; generation failures degrade to the bank inside the provider.
async fn load_questions(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Quiz>, StatusCode> {
    let (category, quiz) = state.catalog.find_quiz(&quiz_id).ok_or(StatusCode::NOT_FOUND)?;

    let personal_info: Option<PersonalInfo> = db::get_profile(&state.pool, user_id)
        .await
        .ok()
        .flatten()
        .and_then(|profile| profile.personal_info)
        .and_then(|value| serde_json::from_value(value).ok());

    let questions = state
        .provider
        .load(&category.id, quiz.difficulty, personal_info.as_ref())
        .await;

    let mut loaded = quiz.clone();
    loaded.questions = questions;
    Ok(Json(loaded))
}

async fn complete_quiz(
    UserSession(user_id): UserSession,
    State(state): State<SharedState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<CompleteRequest>,
) -> Result<Json<CompletionOutcome>, StatusCode> {
    if !(0..=100).contains(&payload.score) || payload.earned_xp < 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (category, quiz) = state.catalog.find_quiz(&quiz_id).ok_or(StatusCode::NOT_FOUND)?;

    let outcome = state
        .ledger
        .complete_quiz(user_id, &quiz.id, &category.id, payload.score, payload.earned_xp)
        .await;

    Ok(Json(outcome))
}
