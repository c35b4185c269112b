mod attempts;
mod manage;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(manage::create_test))
        .route(
            "/:test_id",
            get(manage::get_test).patch(manage::update_test).delete(manage::delete_test),
        )
        .route("/:test_id/questions", get(manage::list_questions))
        .route("/:test_id/attempts", get(attempts::list_attempts))
        .route("/:test_id/start", post(attempts::start_attempt))
        .route("/attempts/:attempt_id/answer", post(attempts::submit_answer))
        .route("/attempts/:attempt_id/complete", post(attempts::complete_attempt))
}
