use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use axum::extract::State;
use serde::Deserialize;

use crate::domain::models::{Difficulty, PersonalInfo, Question};
use crate::services::bank::QUESTIONS_PER_QUIZ;
use crate::state::SharedState;
use crate::web::session;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    category: String,
    difficulty: Difficulty,
    #[serde(default)]
    personal_info: Option<PersonalInfo>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/functions/v1/generate-questions", post(generate))
        .with_state(state)
}

/// The generation endpoint itself: chat-model questions when a key is
/// configured, personalized bank questions otherwise. Replies are never
/// empty — failures degrade instead of erroring.
async fn generate(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<GenerateBody>,
) -> Result<Json<Vec<Question>>, StatusCode> {
    // When an API token is configured, callers must present it.
    if let Some(expected) = &state.generate_token {
        let presented = session::extract_token(&headers);
        if presented.as_deref() != Some(expected.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    let info = body.personal_info.as_ref().filter(|info| !info.is_empty());

    if let Some(ai) = &state.ai {
        match ai
            .generate_questions(&body.category, body.difficulty, info, QUESTIONS_PER_QUIZ)
            .await
        {
            Ok(questions) => return Ok(Json(questions)),
            Err(err) => {
                tracing::warn!("model generation failed, serving personalized bank: {err}");
            }
        }
    }

    Ok(Json(state.bank.personalized(
        &body.category,
        body.difficulty,
        QUESTIONS_PER_QUIZ,
        info,
    )))
}
