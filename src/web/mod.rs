pub mod auth;
pub mod generate;
pub mod profile;
pub mod quizzes;
pub mod session;
pub mod status;

use axum::{routing::get, Router};

use crate::state::SharedState;

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(status::router(state.clone()))
        .merge(quizzes::router(state.clone()))
        .merge(profile::router(state.clone()))
        .merge(generate::router(state.clone()))
        .nest("/auth", auth::router(state))
}
