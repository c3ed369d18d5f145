use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/waitlist", post(handlers::waitlist_form))
        .route("/partnership", post(handlers::partnership_form))
        .route("/api/waitlist", post(handlers::api_waitlist))
        .route("/api/partnerships", post(handlers::api_partnership))
        .route("/api/businesses", get(handlers::api_businesses))
        .route("/api/track/session", post(handlers::track_session))
        .route("/api/track/event", post(handlers::track_event))
        .route("/admin", get(handlers::admin_dashboard))
        .route("/admin/partnerships/:id/status", post(handlers::update_partnership_form))
        .route("/admin/export/:kind", get(handlers::export_csv))
        .route("/api/admin/summary", get(handlers::api_admin_summary))
        .route("/api/admin/waitlist", get(handlers::api_admin_waitlist))
        .route("/api/admin/partnerships", get(handlers::api_admin_partnerships))
        .route("/api/admin/partnerships/:id", patch(handlers::api_update_partnership))
        .with_state(state)
}
