use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::db;
use crate::state::SharedState;

/// Feeds the client's connection indicator. Nothing here is fatal: a false
/// flag only means the corresponding feature currently degrades.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusView {
    store_connected: bool,
    generator_configured: bool,
    ai_configured: bool,
}

pub fn router(state: SharedState) -> Router {
    Router::new().route("/status", get(status)).with_state(state)
}

async fn status(State(state): State<SharedState>) -> Json<StatusView> {
    let store_connected = db::ping(&state.pool).await.is_ok();
    Json(StatusView {
        store_connected,
        generator_configured: state.generator_configured,
        ai_configured: state.ai.is_some(),
    })
}
