use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tip/:amount", post(handlers::quick_add))
        .route("/api/today", get(handlers::get_today))
        .route(
            "/api/tips",
            get(handlers::list_tips)
                .post(handlers::add_tip)
                .delete(handlers::clear_tips),
        )
        .route("/api/tips/:id", delete(handlers::delete_tip))
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/me", get(handlers::get_me))
        .route(
            "/api/me/name",
            put(handlers::set_name).delete(handlers::reset_name),
        )
        .with_state(state)
}
